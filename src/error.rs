use std::fmt;

#[derive(Debug)]
pub enum DossierError {
    MissingPageTemplate,
    UnplaceableBlock(String),
    InvalidConfiguration(String),
    ArtifactNotFound(String),
    Io(std::io::Error),
}

impl fmt::Display for DossierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DossierError::MissingPageTemplate => write!(f, "no page template available"),
            DossierError::UnplaceableBlock(message) => {
                write!(f, "block cannot fit on any page: {}", message)
            }
            DossierError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            DossierError::ArtifactNotFound(name) => {
                write!(f, "report artifact not available: {}", name)
            }
            DossierError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for DossierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DossierError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DossierError {
    fn from(value: std::io::Error) -> Self {
        DossierError::Io(value)
    }
}
