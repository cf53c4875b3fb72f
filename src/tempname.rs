//! Generates the temp file names used between pipeline stages.
//!
//! Patterns match the transfer protocol's wire-visible naming:
//! `<original>.<tag>-<6 unique chars>`.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::{COMPRESSED_ENCRYPTED_TAG, TEMP_SUFFIX_ALPHABET, TEMP_SUFFIX_LEN};

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..TEMP_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..TEMP_SUFFIX_ALPHABET.len());
            TEMP_SUFFIX_ALPHABET[idx] as char
        })
        .collect()
}

/// Builds `<path>.<tag>-<6 unique chars>` next to `path`.
pub fn with_tag(path: &Path, tag: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{tag}-{}", random_suffix()));
    PathBuf::from(name)
}

/// Builds the name under which an incoming file is written to disk
/// before [`crate::pipeline::process_received`] runs on it:
/// `<requested>.comp.enc-<6 unique chars>`, per spec §6's reception
/// naming rule.
pub fn received_name(requested_path: &Path) -> PathBuf {
    with_tag(requested_path, COMPRESSED_ENCRYPTED_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COMPRESSED_TAG, ENCRYPTED_TAG};

    #[test]
    fn appends_tag_and_suffix_of_expected_length() {
        let path = with_tag(Path::new("/tmp/report.txt"), COMPRESSED_TAG);
        let name = path.to_string_lossy().into_owned();
        assert!(name.starts_with("/tmp/report.txt.comp-"));
        let suffix = name.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), TEMP_SUFFIX_LEN);
    }

    #[test]
    fn two_calls_are_extremely_unlikely_to_collide() {
        let a = with_tag(Path::new("f"), ENCRYPTED_TAG);
        let b = with_tag(Path::new("f"), ENCRYPTED_TAG);
        assert_ne!(a, b);
    }

    #[test]
    fn received_name_follows_the_comp_enc_pattern() {
        let path = received_name(Path::new("/tmp/report.txt"));
        let name = path.to_string_lossy().into_owned();
        assert!(name.starts_with("/tmp/report.txt.comp.enc-"));
        let suffix = name.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), TEMP_SUFFIX_LEN);
    }
}
