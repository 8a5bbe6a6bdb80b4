// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Configuration file locations

use std::path::PathBuf;

const SYSTEM_CONFIG_PATH: &str = "/etc/vke.conf";
const USER_CONFIG_FILE: &str = ".vke.conf";
const LOCAL_CONFIG_PATH: &str = "vke.conf";

/// System-wide configuration file
pub fn system_config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG_PATH)
}

/// Per-user configuration file in the home directory
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_CONFIG_FILE))
}

/// Configuration file in the working directory
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".").join(LOCAL_CONFIG_PATH)
}

/// Every configuration file location, lowest precedence first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![system_config_path()];
    paths.extend(user_config_path());
    paths.push(local_config_path());
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_order() {
        let paths = default_config_paths();
        assert_eq!(paths.first(), Some(&system_config_path()));
        assert_eq!(paths.last(), Some(&local_config_path()));
        assert!(paths.last().is_some_and(|p| p.ends_with("vke.conf")));
    }
}
