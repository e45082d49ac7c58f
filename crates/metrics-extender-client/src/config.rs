//! Connection settings for the API server.
//!
//! The pod's service account wins; a kubeconfig is the fallback for running
//! the extender outside the cluster. Credential handling (exec plugins,
//! auth providers, client certificates) is left to kube-rs.

use crate::error::{ClientError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    InCluster,
    /// Explicit kubeconfig path list
    Kubeconfig(Vec<PathBuf>),
    /// `$KUBECONFIG` or `~/.kube/config`
    Default,
}

/// Resolve the cluster configuration.
///
/// In-cluster credentials are tried first. Otherwise `explicit` is used if
/// given; it may hold several paths separated like `$PATH`, which are merged
/// the way kubectl merges `$KUBECONFIG`. Without it kube-rs reads
/// `$KUBECONFIG`, then `~/.kube/config`.
pub async fn infer_config(explicit: Option<&OsStr>) -> Result<(Config, ConfigSource)> {
    match Config::incluster() {
        Ok(config) => {
            info!("Using in-cluster configuration for {}", config.cluster_url);
            return Ok((config, ConfigSource::InCluster));
        }
        Err(e) => debug!("In-cluster configuration unavailable: {}", e),
    }

    let (config, source) = match explicit {
        Some(paths) => {
            let paths = split_kubeconfig_paths(paths);
            let kubeconfig = read_kubeconfigs(&paths)?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)?;
            (config, ConfigSource::Kubeconfig(paths))
        }
        None => {
            let config = Config::from_kubeconfig(&KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)?;
            (config, ConfigSource::Default)
        }
    };

    info!("Using kubeconfig ({:?}) for {}", source, config.cluster_url);
    Ok((config, source))
}

/// Split a `$PATH`-style list, skipping empty entries
pub fn split_kubeconfig_paths(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Read and merge kubeconfig files; earlier files win on conflicts
pub fn read_kubeconfigs(paths: &[PathBuf]) -> Result<Kubeconfig> {
    let mut merged: Option<Kubeconfig> = None;
    for path in paths {
        let next = Kubeconfig::read_from(path).map_err(|e| {
            ClientError::invalid_config(
                format!("failed to load kubeconfig {}: {}", path.display(), e),
                "Pass --kubeconfig a readable kubeconfig file or list of files",
            )
        })?;
        merged = Some(match merged {
            Some(current) => current.merge(next).map_err(kubeconfig_error)?,
            None => next,
        });
    }

    merged.ok_or_else(|| {
        ClientError::invalid_config(
            "the kubeconfig path list is empty",
            "Pass --kubeconfig at least one file",
        )
    })
}

fn kubeconfig_error(e: kube::config::KubeconfigError) -> ClientError {
    ClientError::invalid_config(
        format!("failed to resolve kubeconfig: {}", e),
        "Check current-context and its cluster and user entries, or run inside the cluster",
    )
}
