//! Skill canonicalization: maps résumé surface forms onto one display name per skill.
//!
//! The alias table is built once on first use and never mutated, so concurrent
//! readers need no synchronization.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Lower-cased surface form → canonical display name.
///
/// Every canonical name is also reachable from its own lower-cased form
/// (inserted when the map is built), which keeps `canonicalize` idempotent.
const SKILL_ALIASES: &[(&str, &str)] = &[
    // ── Programming languages ──────────────────────────────────────────────
    ("javascript", "JavaScript"),
    ("java script", "JavaScript"),
    ("js", "JavaScript"),
    ("es6", "JavaScript"),
    ("ecmascript", "JavaScript"),
    ("vanilla js", "JavaScript"),
    ("typescript", "TypeScript"),
    ("ts", "TypeScript"),
    ("python", "Python"),
    ("python3", "Python"),
    ("python 3", "Python"),
    ("py", "Python"),
    ("java", "Java"),
    ("core java", "Java"),
    ("j2ee", "Java"),
    ("java ee", "Java"),
    ("kotlin", "Kotlin"),
    ("scala", "Scala"),
    ("go", "Go"),
    ("golang", "Go"),
    ("rust", "Rust"),
    ("rustlang", "Rust"),
    ("c", "C"),
    ("c++", "C++"),
    ("cpp", "C++"),
    ("cplusplus", "C++"),
    ("c#", "C#"),
    ("csharp", "C#"),
    ("c sharp", "C#"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("objective-c", "Objective-C"),
    ("objective c", "Objective-C"),
    ("objc", "Objective-C"),
    ("r", "R"),
    ("rlang", "R"),
    ("matlab", "MATLAB"),
    ("perl", "Perl"),
    ("dart", "Dart"),
    ("elixir", "Elixir"),
    ("erlang", "Erlang"),
    ("haskell", "Haskell"),
    ("clojure", "Clojure"),
    ("lua", "Lua"),
    ("bash", "Shell Scripting"),
    ("shell", "Shell Scripting"),
    ("shell scripting", "Shell Scripting"),
    ("shell script", "Shell Scripting"),
    ("powershell", "PowerShell"),
    ("sql", "SQL"),
    ("t-sql", "SQL"),
    ("tsql", "SQL"),
    ("pl/sql", "SQL"),
    ("plsql", "SQL"),
    ("solidity", "Solidity"),
    ("fortran", "Fortran"),
    ("cobol", "COBOL"),
    ("assembly", "Assembly"),
    ("vba", "VBA"),
    // ── Frontend ───────────────────────────────────────────────────────────
    ("html", "HTML"),
    ("html5", "HTML"),
    ("css", "CSS"),
    ("css3", "CSS"),
    ("sass", "Sass"),
    ("scss", "Sass"),
    ("less", "Less"),
    ("tailwind", "Tailwind CSS"),
    ("tailwindcss", "Tailwind CSS"),
    ("tailwind css", "Tailwind CSS"),
    ("bootstrap", "Bootstrap"),
    ("material ui", "Material UI"),
    ("material-ui", "Material UI"),
    ("mui", "Material UI"),
    ("react", "React"),
    ("reactjs", "React"),
    ("react.js", "React"),
    ("react js", "React"),
    ("react native", "React Native"),
    ("react-native", "React Native"),
    ("redux", "Redux"),
    ("redux toolkit", "Redux"),
    ("angular", "Angular"),
    ("angularjs", "Angular"),
    ("angular.js", "Angular"),
    ("vue", "Vue.js"),
    ("vuejs", "Vue.js"),
    ("vue.js", "Vue.js"),
    ("nuxt", "Nuxt.js"),
    ("nuxtjs", "Nuxt.js"),
    ("nuxt.js", "Nuxt.js"),
    ("svelte", "Svelte"),
    ("sveltekit", "Svelte"),
    ("next", "Next.js"),
    ("nextjs", "Next.js"),
    ("next.js", "Next.js"),
    ("jquery", "jQuery"),
    ("webpack", "Webpack"),
    ("vite", "Vite"),
    ("babel", "Babel"),
    ("responsive design", "Responsive Design"),
    ("responsive web design", "Responsive Design"),
    ("web accessibility", "Accessibility"),
    ("accessibility", "Accessibility"),
    ("a11y", "Accessibility"),
    ("wcag", "Accessibility"),
    ("figma", "Figma"),
    ("storybook", "Storybook"),
    // ── Backend frameworks & runtimes ──────────────────────────────────────
    ("node", "Node.js"),
    ("nodejs", "Node.js"),
    ("node.js", "Node.js"),
    ("node js", "Node.js"),
    ("express", "Express.js"),
    ("expressjs", "Express.js"),
    ("express.js", "Express.js"),
    ("nestjs", "NestJS"),
    ("nest.js", "NestJS"),
    ("deno", "Deno"),
    ("django", "Django"),
    ("django rest framework", "Django"),
    ("drf", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("fast api", "FastAPI"),
    ("spring", "Spring"),
    ("spring boot", "Spring Boot"),
    ("springboot", "Spring Boot"),
    ("spring-boot", "Spring Boot"),
    ("hibernate", "Hibernate"),
    ("rails", "Ruby on Rails"),
    ("ruby on rails", "Ruby on Rails"),
    ("ror", "Ruby on Rails"),
    ("laravel", "Laravel"),
    ("symfony", "Symfony"),
    (".net", ".NET"),
    ("dotnet", ".NET"),
    ("dot net", ".NET"),
    (".net core", ".NET"),
    ("asp.net", "ASP.NET"),
    ("asp.net core", "ASP.NET"),
    ("asp net", "ASP.NET"),
    ("gin", "Gin"),
    ("actix", "Actix"),
    ("actix-web", "Actix"),
    ("axum", "Axum"),
    ("tokio", "Tokio"),
    ("graphql", "GraphQL"),
    ("graph ql", "GraphQL"),
    ("apollo", "GraphQL"),
    ("rest", "REST APIs"),
    ("rest api", "REST APIs"),
    ("rest apis", "REST APIs"),
    ("restful", "REST APIs"),
    ("restful api", "REST APIs"),
    ("restful apis", "REST APIs"),
    ("restful services", "REST APIs"),
    ("grpc", "gRPC"),
    ("protobuf", "gRPC"),
    ("websocket", "WebSockets"),
    ("websockets", "WebSockets"),
    ("microservices", "Microservices"),
    ("microservice", "Microservices"),
    ("micro services", "Microservices"),
    ("micro-services", "Microservices"),
    ("soa", "Microservices"),
    ("event driven architecture", "Event-Driven Architecture"),
    ("event-driven architecture", "Event-Driven Architecture"),
    ("event driven", "Event-Driven Architecture"),
    ("system design", "System Design"),
    ("distributed systems", "Distributed Systems"),
    ("distributed system", "Distributed Systems"),
    // ── Mobile ─────────────────────────────────────────────────────────────
    ("android", "Android"),
    ("android sdk", "Android"),
    ("ios", "iOS"),
    ("swiftui", "SwiftUI"),
    ("flutter", "Flutter"),
    ("xamarin", "Xamarin"),
    ("ionic", "Ionic"),
    ("jetpack compose", "Jetpack Compose"),
    // ── Data, ML & AI ──────────────────────────────────────────────────────
    ("machine learning", "Machine Learning"),
    ("ml", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("dl", "Deep Learning"),
    ("artificial intelligence", "Artificial Intelligence"),
    ("ai", "Artificial Intelligence"),
    ("natural language processing", "NLP"),
    ("nlp", "NLP"),
    ("computer vision", "Computer Vision"),
    ("cv", "Computer Vision"),
    ("generative ai", "Generative AI"),
    ("genai", "Generative AI"),
    ("gen ai", "Generative AI"),
    ("llm", "Large Language Models"),
    ("llms", "Large Language Models"),
    ("large language models", "Large Language Models"),
    ("large language model", "Large Language Models"),
    ("prompt engineering", "Prompt Engineering"),
    ("tensorflow", "TensorFlow"),
    ("tensor flow", "TensorFlow"),
    ("tf", "TensorFlow"),
    ("keras", "Keras"),
    ("pytorch", "PyTorch"),
    ("py torch", "PyTorch"),
    ("torch", "PyTorch"),
    ("scikit-learn", "scikit-learn"),
    ("scikit learn", "scikit-learn"),
    ("sklearn", "scikit-learn"),
    ("pandas", "Pandas"),
    ("numpy", "NumPy"),
    ("scipy", "SciPy"),
    ("matplotlib", "Matplotlib"),
    ("seaborn", "Seaborn"),
    ("jupyter", "Jupyter"),
    ("jupyter notebook", "Jupyter"),
    ("hugging face", "Hugging Face"),
    ("huggingface", "Hugging Face"),
    ("transformers", "Hugging Face"),
    ("langchain", "LangChain"),
    ("opencv", "OpenCV"),
    ("xgboost", "XGBoost"),
    ("mlops", "MLOps"),
    ("ml ops", "MLOps"),
    ("data science", "Data Science"),
    ("data analysis", "Data Analysis"),
    ("data analytics", "Data Analysis"),
    ("data engineering", "Data Engineering"),
    ("data visualization", "Data Visualization"),
    ("data visualisation", "Data Visualization"),
    ("statistics", "Statistics"),
    ("statistical analysis", "Statistics"),
    ("etl", "ETL"),
    ("elt", "ETL"),
    ("data pipelines", "Data Pipelines"),
    ("data pipeline", "Data Pipelines"),
    ("apache spark", "Apache Spark"),
    ("spark", "Apache Spark"),
    ("pyspark", "Apache Spark"),
    ("hadoop", "Hadoop"),
    ("hive", "Hive"),
    ("apache kafka", "Kafka"),
    ("kafka", "Kafka"),
    ("airflow", "Apache Airflow"),
    ("apache airflow", "Apache Airflow"),
    ("dbt", "dbt"),
    ("flink", "Apache Flink"),
    ("apache flink", "Apache Flink"),
    ("tableau", "Tableau"),
    ("power bi", "Power BI"),
    ("powerbi", "Power BI"),
    ("looker", "Looker"),
    ("excel", "Excel"),
    ("ms excel", "Excel"),
    ("microsoft excel", "Excel"),
    // ── Databases & storage ────────────────────────────────────────────────
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("psql", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("my sql", "MySQL"),
    ("mariadb", "MariaDB"),
    ("sqlite", "SQLite"),
    ("oracle", "Oracle Database"),
    ("oracle db", "Oracle Database"),
    ("oracle database", "Oracle Database"),
    ("sql server", "SQL Server"),
    ("mssql", "SQL Server"),
    ("ms sql", "SQL Server"),
    ("microsoft sql server", "SQL Server"),
    ("mongodb", "MongoDB"),
    ("mongo", "MongoDB"),
    ("mongo db", "MongoDB"),
    ("mongoose", "MongoDB"),
    ("redis", "Redis"),
    ("memcached", "Memcached"),
    ("cassandra", "Cassandra"),
    ("apache cassandra", "Cassandra"),
    ("dynamodb", "DynamoDB"),
    ("dynamo db", "DynamoDB"),
    ("elasticsearch", "Elasticsearch"),
    ("elastic search", "Elasticsearch"),
    ("elk", "Elasticsearch"),
    ("opensearch", "Elasticsearch"),
    ("neo4j", "Neo4j"),
    ("firebase", "Firebase"),
    ("firestore", "Firebase"),
    ("supabase", "Supabase"),
    ("snowflake", "Snowflake"),
    ("bigquery", "BigQuery"),
    ("big query", "BigQuery"),
    ("redshift", "Redshift"),
    ("nosql", "NoSQL"),
    ("no sql", "NoSQL"),
    ("rabbitmq", "RabbitMQ"),
    ("rabbit mq", "RabbitMQ"),
    ("sqs", "AWS"),
    // ── Cloud ──────────────────────────────────────────────────────────────
    ("aws", "AWS"),
    ("amazon web services", "AWS"),
    ("ec2", "AWS"),
    ("s3", "AWS"),
    ("aws lambda", "AWS"),
    ("lambda", "AWS"),
    ("cloudformation", "AWS"),
    ("azure", "Azure"),
    ("microsoft azure", "Azure"),
    ("ms azure", "Azure"),
    ("gcp", "GCP"),
    ("google cloud", "GCP"),
    ("google cloud platform", "GCP"),
    ("heroku", "Heroku"),
    ("vercel", "Vercel"),
    ("netlify", "Netlify"),
    ("digitalocean", "DigitalOcean"),
    ("digital ocean", "DigitalOcean"),
    ("cloud computing", "Cloud Computing"),
    ("serverless", "Serverless"),
    // ── DevOps & infrastructure ────────────────────────────────────────────
    ("docker", "Docker"),
    ("dockerfile", "Docker"),
    ("docker compose", "Docker"),
    ("docker-compose", "Docker"),
    ("containers", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("k8s", "Kubernetes"),
    ("eks", "Kubernetes"),
    ("aks", "Kubernetes"),
    ("gke", "Kubernetes"),
    ("openshift", "Kubernetes"),
    ("helm", "Helm"),
    ("terraform", "Terraform"),
    ("infrastructure as code", "Infrastructure as Code"),
    ("iac", "Infrastructure as Code"),
    ("ansible", "Ansible"),
    ("puppet", "Puppet"),
    ("chef", "Chef"),
    ("jenkins", "Jenkins"),
    ("github actions", "GitHub Actions"),
    ("gitlab ci", "GitLab CI"),
    ("gitlab-ci", "GitLab CI"),
    ("circleci", "CircleCI"),
    ("circle ci", "CircleCI"),
    ("travis ci", "Travis CI"),
    ("argocd", "Argo CD"),
    ("argo cd", "Argo CD"),
    ("ci/cd", "CI/CD"),
    ("ci cd", "CI/CD"),
    ("cicd", "CI/CD"),
    ("ci-cd", "CI/CD"),
    ("continuous integration", "CI/CD"),
    ("continuous deployment", "CI/CD"),
    ("continuous delivery", "CI/CD"),
    ("devops", "DevOps"),
    ("dev ops", "DevOps"),
    ("sre", "Site Reliability Engineering"),
    ("site reliability engineering", "Site Reliability Engineering"),
    ("linux", "Linux"),
    ("unix", "Unix"),
    ("ubuntu", "Linux"),
    ("nginx", "Nginx"),
    ("apache", "Apache HTTP Server"),
    ("prometheus", "Prometheus"),
    ("grafana", "Grafana"),
    ("datadog", "Datadog"),
    ("new relic", "New Relic"),
    ("splunk", "Splunk"),
    ("observability", "Observability"),
    ("monitoring", "Observability"),
    ("git", "Git"),
    ("github", "GitHub"),
    ("gitlab", "GitLab"),
    ("bitbucket", "Bitbucket"),
    ("version control", "Git"),
    ("svn", "SVN"),
    ("subversion", "SVN"),
    // ── Testing ────────────────────────────────────────────────────────────
    ("unit testing", "Unit Testing"),
    ("unit tests", "Unit Testing"),
    ("unit test", "Unit Testing"),
    ("integration testing", "Integration Testing"),
    ("integration tests", "Integration Testing"),
    ("tdd", "TDD"),
    ("test driven development", "TDD"),
    ("test-driven development", "TDD"),
    ("bdd", "BDD"),
    ("behavior driven development", "BDD"),
    ("jest", "Jest"),
    ("mocha", "Mocha"),
    ("cypress", "Cypress"),
    ("playwright", "Playwright"),
    ("selenium", "Selenium"),
    ("pytest", "pytest"),
    ("junit", "JUnit"),
    ("testng", "TestNG"),
    ("postman", "Postman"),
    ("qa", "Quality Assurance"),
    ("quality assurance", "Quality Assurance"),
    ("automation testing", "Test Automation"),
    ("test automation", "Test Automation"),
    ("load testing", "Performance Testing"),
    ("performance testing", "Performance Testing"),
    ("jmeter", "Performance Testing"),
    // ── Security ───────────────────────────────────────────────────────────
    ("cybersecurity", "Cybersecurity"),
    ("cyber security", "Cybersecurity"),
    ("information security", "Cybersecurity"),
    ("infosec", "Cybersecurity"),
    ("network security", "Network Security"),
    ("penetration testing", "Penetration Testing"),
    ("pen testing", "Penetration Testing"),
    ("pentesting", "Penetration Testing"),
    ("ethical hacking", "Penetration Testing"),
    ("owasp", "OWASP"),
    ("oauth", "OAuth"),
    ("oauth2", "OAuth"),
    ("oauth 2.0", "OAuth"),
    ("jwt", "JWT"),
    ("json web token", "JWT"),
    ("sso", "SSO"),
    ("single sign-on", "SSO"),
    ("single sign on", "SSO"),
    ("saml", "SAML"),
    ("iam", "IAM"),
    ("identity and access management", "IAM"),
    ("encryption", "Cryptography"),
    ("cryptography", "Cryptography"),
    ("siem", "SIEM"),
    ("soc 2", "SOC 2"),
    ("soc2", "SOC 2"),
    ("gdpr", "GDPR"),
    ("iso 27001", "ISO 27001"),
    ("vulnerability assessment", "Vulnerability Management"),
    ("vulnerability management", "Vulnerability Management"),
    ("devsecops", "DevSecOps"),
    // ── Methodologies & practices ──────────────────────────────────────────
    ("agile", "Agile"),
    ("agile methodology", "Agile"),
    ("agile methodologies", "Agile"),
    ("scrum", "Scrum"),
    ("kanban", "Kanban"),
    ("lean", "Lean"),
    ("waterfall", "Waterfall"),
    ("safe", "SAFe"),
    ("jira", "Jira"),
    ("confluence", "Confluence"),
    ("trello", "Trello"),
    ("code review", "Code Review"),
    ("code reviews", "Code Review"),
    ("pair programming", "Pair Programming"),
    ("oop", "Object-Oriented Programming"),
    ("object oriented programming", "Object-Oriented Programming"),
    ("object-oriented programming", "Object-Oriented Programming"),
    ("object oriented design", "Object-Oriented Programming"),
    ("functional programming", "Functional Programming"),
    ("design patterns", "Design Patterns"),
    ("data structures", "Data Structures & Algorithms"),
    ("algorithms", "Data Structures & Algorithms"),
    ("data structures and algorithms", "Data Structures & Algorithms"),
    ("dsa", "Data Structures & Algorithms"),
    ("solid", "SOLID Principles"),
    ("solid principles", "SOLID Principles"),
    ("clean code", "Clean Code"),
    ("domain driven design", "Domain-Driven Design"),
    ("domain-driven design", "Domain-Driven Design"),
    ("ddd", "Domain-Driven Design"),
    ("project management", "Project Management"),
    ("product management", "Product Management"),
    ("pmp", "Project Management"),
    ("stakeholder management", "Stakeholder Management"),
    ("technical leadership", "Technical Leadership"),
    ("team leadership", "Leadership"),
    ("leadership", "Leadership"),
    ("mentoring", "Mentoring"),
    ("mentorship", "Mentoring"),
    ("communication", "Communication"),
    ("communication skills", "Communication"),
    ("problem solving", "Problem Solving"),
    ("problem-solving", "Problem Solving"),
    ("ux", "UX Design"),
    ("ux design", "UX Design"),
    ("ui/ux", "UX Design"),
    ("ui ux", "UX Design"),
    ("user experience", "UX Design"),
    ("ui design", "UI Design"),
    ("user interface design", "UI Design"),
    // ── Misc tooling & platforms ───────────────────────────────────────────
    ("blockchain", "Blockchain"),
    ("web3", "Web3"),
    ("ethereum", "Ethereum"),
    ("unity", "Unity"),
    ("unreal engine", "Unreal Engine"),
    ("salesforce", "Salesforce"),
    ("sap", "SAP"),
    ("servicenow", "ServiceNow"),
    ("shopify", "Shopify"),
    ("wordpress", "WordPress"),
    ("embedded systems", "Embedded Systems"),
    ("embedded c", "Embedded Systems"),
    ("rtos", "Embedded Systems"),
    ("iot", "IoT"),
    ("internet of things", "IoT"),
    ("networking", "Networking"),
    ("tcp/ip", "Networking"),
    ("webassembly", "WebAssembly"),
    ("wasm", "WebAssembly"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("api design", "API Design"),
    ("openapi", "API Design"),
    ("swagger", "API Design"),
];

/// Surface forms too common as ordinary English (or too short) to claim from a
/// bare token. They are still found by phrase context and by targeted search
/// for job-required skills.
pub const AMBIGUOUS_TOKENS: &[&str] = &[
    "go", "r", "c", "less", "rest", "express", "spring", "lean", "safe", "solid", "next",
    "shell", "chef", "puppet", "hive", "lambda", "gin", "torch", "apollo", "containers",
    "monitoring", "assembly", "algorithms", "communication", "leadership", "statistics",
    "networking", "transformers",
];

static ALIAS_MAP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map: HashMap<String, &'static str> = SKILL_ALIASES
        .iter()
        .map(|(alias, canonical)| (alias.to_string(), *canonical))
        .collect();
    for (_, canonical) in SKILL_ALIASES {
        map.entry(canonical.to_lowercase()).or_insert(canonical);
    }
    map
});

/// Canonical name → every lower-cased alias that maps to it, sorted.
static REVERSE_INDEX: LazyLock<BTreeMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    let mut index: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    for (alias, canonical) in all_aliases() {
        index.entry(canonical).or_default().push(alias);
    }
    for aliases in index.values_mut() {
        aliases.sort_unstable();
    }
    index
});

/// Normalizes a skill name onto its canonical display form.
///
/// Lookup order: exact lower-cased key, key with internal whitespace removed,
/// key with a single trailing `s` removed, and finally a title-cased rendering
/// of the input. Total, pure and idempotent.
pub fn canonicalize(skill: &str) -> String {
    let key = normalize_key(skill);
    if key.is_empty() {
        return String::new();
    }
    if let Some(canonical) = lookup(&key) {
        return canonical.to_string();
    }
    let compact: String = key.split_whitespace().collect();
    if let Some(canonical) = lookup(&compact) {
        return canonical.to_string();
    }
    if let Some(singular) = key.strip_suffix('s') {
        if let Some(canonical) = lookup(singular) {
            return canonical.to_string();
        }
    }
    title_case(&key)
}

/// Direct alias lookup on an already lower-cased key.
pub fn lookup(key: &str) -> Option<&'static str> {
    ALIAS_MAP.get(key).copied()
}

/// Every alias (lower-cased) that canonicalizes to `canonical`.
pub fn aliases_for(canonical: &str) -> &'static [&'static str] {
    REVERSE_INDEX
        .get(canonical)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Iterates over the whole alias table as `(alias, canonical)` pairs.
pub fn all_aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    let map: &'static HashMap<String, &'static str> = &ALIAS_MAP;
    map.iter().map(|(alias, canonical)| (alias.as_str(), *canonical))
}

pub fn is_ambiguous_token(token: &str) -> bool {
    AMBIGUOUS_TOKENS.contains(&token)
}

fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(lowered: &str) -> String {
    lowered
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => upper_initial(first).to_string() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-cases a leading letter only when it maps one-to-one and lower-cases
/// back, so the rendered fallback canonicalizes to itself.
fn upper_initial(first: char) -> char {
    let mut upper = first.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u.to_lowercase().eq(std::iter::once(first)) => u,
        _ => first,
    }
}
