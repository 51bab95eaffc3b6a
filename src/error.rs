use thiserror::Error;

pub type Result<T> = std::result::Result<T, GconcError>;

#[derive(Error, Debug)]
pub enum GconcError {
    #[error("Unsupported weight kind: {0}")]
    UnsupportedWeightKind(String),
    #[error("Unsupported metric: {0}")]
    UnsupportedMetric(String),
    #[error("Unsupported entity type: {0}")]
    UnsupportedEntityType(String),
    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),
    #[error("Commit sequence is empty")]
    EmptyCommitSequence,
    #[error("No identity mapped for {email} in {repository}")]
    MissingIdentity { repository: String, email: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

// gix errors are large; keep them boxed inside the enum.
impl From<gix::object::find::existing::Error> for GconcError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GconcError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for GconcError {
    fn from(err: gix::object::commit::Error) -> Self {
        GconcError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for GconcError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GconcError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GconcError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GconcError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for GconcError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GconcError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GconcError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GconcError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for GconcError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        GconcError::DiffTreeToTree(Box::new(err))
    }
}

impl From<gix::discover::Error> for GconcError {
    fn from(err: gix::discover::Error) -> Self {
        GconcError::GitDiscover(Box::new(err))
    }
}
