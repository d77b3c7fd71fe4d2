//! ROM intake checks and load failures.

use crate::machine::MachineError;

/// Errors that can occur when loading a ROM into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No file was selected, or the file is empty.
    NoFile,

    /// The ROM exceeds the configured size limit.
    TooLarge { size: usize, limit: usize },

    /// The machine refused the ROM.
    Machine(MachineError),
}

impl LoadError {
    /// Whether the error was caused by the user's selection rather than
    /// by the machine. These leave the session untouched.
    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::NoFile | Self::TooLarge { .. })
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFile => write!(f, "no ROM file selected"),
            Self::TooLarge { size, limit } => {
                write!(f, "ROM is {size} bytes, the limit is {limit} bytes")
            }
            Self::Machine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Machine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MachineError> for LoadError {
    fn from(e: MachineError) -> Self {
        Self::Machine(e)
    }
}

/// Check a ROM image before anything about the session is touched.
pub fn validate(rom: &[u8], max_rom_size: Option<usize>) -> Result<(), LoadError> {
    if rom.is_empty() {
        return Err(LoadError::NoFile);
    }
    if let Some(limit) = max_rom_size
        && rom.len() > limit
    {
        return Err(LoadError::TooLarge {
            size: rom.len(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rom_is_no_file() {
        assert_eq!(validate(&[], None), Err(LoadError::NoFile));
    }

    #[test]
    fn no_limit_accepts_anything() {
        assert!(validate(&[0; 4096], None).is_ok());
    }

    #[test]
    fn limit_is_inclusive() {
        assert!(validate(&[0; 1024], Some(1024)).is_ok());
        assert_eq!(
            validate(&[0; 1025], Some(1024)),
            Err(LoadError::TooLarge {
                size: 1025,
                limit: 1024
            })
        );
    }

    #[test]
    fn user_input_classification() {
        assert!(LoadError::NoFile.is_user_input());
        assert!(!LoadError::Machine(MachineError::Fault("x".into())).is_user_input());
    }
}
