use std::fmt;

#[derive(Debug, Clone)]
pub enum UrlshortError {
    DatabaseOpen(String),
    DatabaseLocked(String),
    Transaction(String),
    NestedTransaction(String),
    FileOperation(String),
    SeedParse(String),
    Validation(String),
    Config(String),
}

impl UrlshortError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            UrlshortError::DatabaseOpen(_) => "E001",
            UrlshortError::DatabaseLocked(_) => "E002",
            UrlshortError::Transaction(_) => "E003",
            UrlshortError::NestedTransaction(_) => "E004",
            UrlshortError::FileOperation(_) => "E005",
            UrlshortError::SeedParse(_) => "E006",
            UrlshortError::Validation(_) => "E007",
            UrlshortError::Config(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            UrlshortError::DatabaseOpen(_) => "Database Open Error",
            UrlshortError::DatabaseLocked(_) => "Database Locked",
            UrlshortError::Transaction(_) => "Transaction Error",
            UrlshortError::NestedTransaction(_) => "Nested Transaction",
            UrlshortError::FileOperation(_) => "File Operation Error",
            UrlshortError::SeedParse(_) => "Seed Parse Error",
            UrlshortError::Validation(_) => "Validation Error",
            UrlshortError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            UrlshortError::DatabaseOpen(msg)
            | UrlshortError::DatabaseLocked(msg)
            | UrlshortError::Transaction(msg)
            | UrlshortError::NestedTransaction(msg)
            | UrlshortError::FileOperation(msg)
            | UrlshortError::SeedParse(msg)
            | UrlshortError::Validation(msg)
            | UrlshortError::Config(msg) => msg,
        }
    }

    /// Fatal errors printed before the logger exists use this format.
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for UrlshortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for UrlshortError {}

// 便捷的构造函数
impl UrlshortError {
    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        UrlshortError::DatabaseOpen(msg.into())
    }

    pub fn database_locked<T: Into<String>>(msg: T) -> Self {
        UrlshortError::DatabaseLocked(msg.into())
    }

    pub fn transaction<T: Into<String>>(msg: T) -> Self {
        UrlshortError::Transaction(msg.into())
    }

    pub fn nested_transaction<T: Into<String>>(msg: T) -> Self {
        UrlshortError::NestedTransaction(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        UrlshortError::FileOperation(msg.into())
    }

    pub fn seed_parse<T: Into<String>>(msg: T) -> Self {
        UrlshortError::SeedParse(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        UrlshortError::Validation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        UrlshortError::Config(msg.into())
    }
}

// redb 的各类事务错误统一归为 Transaction
impl From<redb::TransactionError> for UrlshortError {
    fn from(err: redb::TransactionError) -> Self {
        UrlshortError::Transaction(err.to_string())
    }
}

impl From<redb::TableError> for UrlshortError {
    fn from(err: redb::TableError) -> Self {
        UrlshortError::Transaction(err.to_string())
    }
}

impl From<redb::StorageError> for UrlshortError {
    fn from(err: redb::StorageError) -> Self {
        UrlshortError::Transaction(err.to_string())
    }
}

impl From<redb::CommitError> for UrlshortError {
    fn from(err: redb::CommitError) -> Self {
        UrlshortError::Transaction(err.to_string())
    }
}

impl From<redb::DatabaseError> for UrlshortError {
    fn from(err: redb::DatabaseError) -> Self {
        if matches!(err, redb::DatabaseError::DatabaseAlreadyOpen) {
            UrlshortError::DatabaseLocked(err.to_string())
        } else {
            UrlshortError::DatabaseOpen(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for UrlshortError {
    fn from(err: serde_yaml::Error) -> Self {
        UrlshortError::SeedParse(format!("Invalid seed document: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, UrlshortError>;
