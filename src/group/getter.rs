//! Getter Module
//!
//! The loader capability a group calls on a local miss.

use async_trait::async_trait;

// == Getter ==
/// Loads the value for a key from the source of truth (a database, a file,
/// another service).
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Getter Fn ==
/// Adapts a plain synchronous closure into a [`Getter`].
///
/// ```
/// use distcache::group::GetterFn;
///
/// let getter = GetterFn::new(|key| Ok(key.as_bytes().to_vec()));
/// # let _ = getter;
/// ```
pub struct GetterFn<F>(pub F);

impl<F> GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}
