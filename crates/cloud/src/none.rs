//! A no-op provider: every operation succeeds trivially, and no path ever
//! exists. Used when no cloud target is configured, so the orchestrator
//! never needs an `if provider != none` branch around a mirror call.

use std::path::Path;

use crate::{CloudError, CloudProvider, CloudSession, CloudStat, Credentials};

/// A provider with no remote backing store.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoneProvider;

impl CloudProvider for NoneProvider {
    fn login(&self, _creds: Option<&Credentials>) -> Result<Box<dyn CloudSession>, CloudError> {
        Ok(Box::new(NoneSession))
    }
}

/// The session type returned by [`NoneProvider::login`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoneSession;

impl CloudSession for NoneSession {
    fn mkdir(&mut self, _path: &str) -> Result<(), CloudError> {
        Ok(())
    }

    fn readdir(&mut self, _path: &str) -> Result<Vec<String>, CloudError> {
        Ok(Vec::new())
    }

    fn stat(&mut self, _path: &str) -> Result<Option<CloudStat>, CloudError> {
        Ok(None)
    }

    fn rename(&mut self, _old: &str, _new: &str) -> Result<(), CloudError> {
        Ok(())
    }

    fn upload(&mut self, _local_src: &Path, _remote_dst: &str) -> Result<(), CloudError> {
        Ok(())
    }

    fn download(&mut self, _remote_src: &str, _local_dst: &Path) -> Result<(), CloudError> {
        Ok(())
    }

    fn remove(&mut self, _remote_path: &str) -> Result<(), CloudError> {
        Ok(())
    }

    fn logout(self: Box<Self>) -> Result<(), CloudError> {
        Ok(())
    }
}
