/// Authenticated administrator on whose behalf a request runs.
///
/// Built by the auth middleware and handed to services explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    pub name: String,
}

impl AdminContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
