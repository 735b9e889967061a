//! The fixed catalog of available translations

use std::path::Path;

use super::version::Version;

/// (name, language, key) of every translation offered for download
const BUILTIN_VERSIONS: &[(&str, &str, &str)] = &[
    ("The Arabic Bible (SVD)", "Arabic", "ar_svd"),
    ("Chinese Union Version (CUV)", "Chinese", "zh_cuv"),
    ("New Chinese Version (NCV)", "Chinese", "zh_ncv"),
    ("Schlachter", "German", "de_schlachter"),
    ("Modern Greek", "Greek", "el_greek"),
    ("Bible in Basic English (BBE)", "English", "en_bbe"),
    ("King James Version (KJV)", "English", "en_kjv"),
    ("Esperanto", "Esperanto", "eo_esperanto"),
    ("Reina Valera (RVR)", "Spanish", "es_rvr"),
    ("Finnish Bible", "Finnish", "fi_finnish"),
    ("Pyhä Raamattu", "Finnish", "fi_pr"),
    ("Le Bible de I'Épée", "French", "fr_apee"),
    ("Korean Version", "Korean", "ko_ko"),
    ("Almeida Revisada Imprensa Bíblica", "Portuguese", "pt_aa"),
    ("Almeida Corrigida e Revisada Fiel", "Portuguese", "pt_acf"),
    ("Nova Versão Internacional", "Portuguese", "pt_nvi"),
    ("Versiunea Dumitru Cornilescu", "Romanian", "ro_cornilescu"),
    ("Синодальный перевод", "Russian", "ru_synodal"),
    ("Tiếng Việt", "Vietnamese", "vi_vietnamese"),
];

/// Translations known to the app, keyed by translation key
///
/// Iteration follows the display order of the catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    versions: Vec<Version>,
}

impl Catalog {
    /// The built-in catalog, with converted files expected in `downloads_dir`
    pub fn builtin(downloads_dir: &Path) -> Self {
        let versions = BUILTIN_VERSIONS
            .iter()
            .map(|(name, language, key)| Version::new(*name, *language, *key, downloads_dir))
            .collect();
        Self { versions }
    }

    /// A catalog made of the given versions
    ///
    /// Later entries with an already used key are dropped.
    pub fn from_versions(versions: impl IntoIterator<Item = Version>) -> Self {
        let mut unique: Vec<Version> = Vec::new();
        for version in versions {
            if unique.iter().any(|v| v.key() == version.key()) {
                log::warn!("Ignoring duplicate translation key {}", version.key());
                continue;
            }
            unique.push(version);
        }
        Self { versions: unique }
    }

    pub fn get(&self, key: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Versions already converted and available offline
    pub fn downloaded(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(|v| v.is_downloaded())
    }
}
