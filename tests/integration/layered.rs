//! Tests demonstrating layered configuration from multiple sources:
//! environment variables, properties files, explicit overrides, and defaults.

use std::io::Write;

use agentcfg::layers::env::MockEnv;
use agentcfg::{
    BindError, Configuration, Contract, Driver, DriverError, LoadError, MaterializedConfig,
    OptionDescriptor, ResultType, builder,
};
use camino::Utf8PathBuf;
use tempfile::NamedTempFile;

/// Server configuration loaded from file, environment and overrides.
#[derive(Debug)]
struct ServerConfig {
    host: String,
    port: i32,
    database: DatabaseConfig,
}

/// Database connection configuration.
#[derive(Debug)]
struct DatabaseConfig {
    url: String,
    max_connections: i32,
    timeout_secs: i64,
}

impl Configuration for DatabaseConfig {
    fn contract() -> Contract {
        Contract::new("DatabaseConfig")
            .with_option(OptionDescriptor::new("url", ResultType::string()))
            .with_option(OptionDescriptor::new("maxConnections", ResultType::i32()).default_value("10"))
            .with_option(OptionDescriptor::new("timeoutSecs", ResultType::i64()).default_value("30"))
    }

    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
        Ok(Self {
            url: config.extract("url")?,
            max_connections: config.extract("maxConnections")?,
            timeout_secs: config.extract("timeoutSecs")?,
        })
    }
}

impl Configuration for ServerConfig {
    fn contract() -> Contract {
        Contract::new("ServerConfig")
            .with_option(OptionDescriptor::new("app.host", ResultType::string()).default_value("localhost"))
            .with_option(OptionDescriptor::new("app.port", ResultType::i32()).default_value("8080"))
            .with_option(OptionDescriptor::new(
                "app.database",
                ResultType::nested(DatabaseConfig::contract()),
            ))
    }

    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
        Ok(Self {
            host: config.extract("app.host")?,
            port: config.extract("app.port")?,
            database: config.extract_nested("app.database")?,
        })
    }
}

fn create_temp_properties(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".properties").unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_layered_all_sources() {
    let properties = "\
app.host = 0.0.0.0
app.port = 3000
app.database.url = postgres://localhost/mydb
app.database.maxConnections = 20
";

    let env = MockEnv::from_pairs([("APP__PORT", "4000"), ("APP__DATABASE__TIMEOUT_SECS", "60")]);

    let config = builder::<ServerConfig>()
        .unwrap()
        .env(|e| e.prefix("APP").source(env))
        .file(|f| f.content(properties, "app.properties"))
        .overrides([("app.host", "override-host")])
        .build();

    let output = Driver::new(config).run().unwrap();
    let server = output.value;

    // Override beats file
    assert_eq!(server.host, "override-host");
    // File beats env
    assert_eq!(server.port, 3000);
    assert_eq!(server.database.url, "postgres://localhost/mydb");
    assert_eq!(server.database.max_connections, 20);
    // Env beats default
    assert_eq!(server.database.timeout_secs, 60);

    let database = output.report.config.nested("app.database").unwrap();
    assert!(database.provenance("timeoutSecs").unwrap().is_env());
    assert!(database.provenance("maxConnections").unwrap().is_file());
}

#[test]
fn test_layered_env_only_falls_back_to_defaults() {
    let env = MockEnv::from_pairs([("APP__DATABASE__URL", "postgres://env/db")]);

    let config = builder::<ServerConfig>()
        .unwrap()
        .env(|e| e.prefix("APP").source(env))
        .build();

    let server = Driver::new(config).run().unwrap().get_silent();
    assert_eq!(server.host, "localhost");
    assert_eq!(server.port, 8080);
    assert_eq!(server.database.url, "postgres://env/db");
    assert_eq!(server.database.max_connections, 10);
    assert_eq!(server.database.timeout_secs, 30);
}

#[test]
fn test_layered_missing_required_field() {
    let config = builder::<ServerConfig>()
        .unwrap()
        .file(|f| f.content("app.port=5000\n", "app.properties"))
        .build();

    let err = Driver::new(config).run().unwrap_err();
    match err {
        DriverError::Bind(err) => assert_eq!(err.key(), Some("app.database.url")),
        other => panic!("expected bind error, got {other}"),
    }
}

#[test]
fn test_layered_file_from_disk() {
    let file = create_temp_properties("app.database.url=postgres://disk/db\n");
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();

    let config = builder::<ServerConfig>()
        .unwrap()
        .file(|f| f.path("/definitely/not/here.properties").path(path.clone()))
        .build();

    let output = Driver::new(config).run().unwrap();
    assert_eq!(output.value.database.url, "postgres://disk/db");
    assert_eq!(
        output.report.file_resolution.as_ref().and_then(|r| r.picked()),
        Some(&path)
    );
}

#[test]
fn test_layered_syntax_error_names_line() {
    let config = builder::<ServerConfig>()
        .unwrap()
        .file(|f| f.content("app.port=1\napp.host=\\uZZZZ\n", "broken.properties"))
        .build();

    match Driver::new(config).run().unwrap_err() {
        DriverError::Load(LoadError::Syntax { path, line, .. }) => {
            assert_eq!(path.as_str(), "broken.properties");
            assert_eq!(line, 2);
        }
        other => panic!("expected syntax error, got {other}"),
    }
}
