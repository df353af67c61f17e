use std::{fmt, ops::Deref};

/// A fatal build error. Per-file compile failures are demoted to warnings at
/// the unit boundary and never become a `BuildError`.
#[derive(Debug)]
pub struct BuildError(anyhow::Error);

impl BuildError {
  pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
    Self(anyhow::Error::msg(message))
  }

  pub fn into_inner(self) -> anyhow::Error {
    self.0
  }
}

impl Deref for BuildError {
  type Target = anyhow::Error;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(error)
  }
}

impl From<std::io::Error> for BuildError {
  fn from(error: std::io::Error) -> Self {
    Self(error.into())
  }
}

impl From<serde_json::Error> for BuildError {
  fn from(error: serde_json::Error) -> Self {
    Self(error.into())
  }
}

pub type BuildResult<T> = Result<T, BuildError>;
