// src/manifest/fmri.rs

//! Package FMRIs (`pkg://publisher/name@release,build-branch:timestamp`)

use std::fmt;
use thiserror::Error;

/// FMRI syntax errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FmriError {
    /// Version has a release but no `,build_release` part
    #[error("{0}: missing build version")]
    MissingBuildVersion(String),

    #[error("{0}: invalid package name")]
    InvalidName(String),

    #[error("{fmri}: invalid version '{version}'")]
    InvalidVersion { fmri: String, version: String },
}

/// Parsed package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub release: String,
    pub build_release: String,
    pub branch: Option<String>,
    pub timestamp: Option<String>,
}

impl Version {
    fn parse(fmri: &str, text: &str) -> Result<Self, FmriError> {
        let invalid = || FmriError::InvalidVersion {
            fmri: fmri.to_string(),
            version: text.to_string(),
        };

        let (rest, timestamp) = match text.split_once(':') {
            Some((rest, ts)) => (rest, Some(ts.to_string())),
            None => (text, None),
        };
        let (rest, branch) = match rest.split_once('-') {
            Some((rest, branch)) => (rest, Some(branch.to_string())),
            None => (rest, None),
        };
        let (release, build_release) = rest
            .split_once(',')
            .ok_or_else(|| FmriError::MissingBuildVersion(fmri.to_string()))?;

        if !is_dotted_sequence(release) || !is_dotted_sequence(build_release) {
            return Err(invalid());
        }
        if let Some(branch) = &branch
            && !is_dotted_sequence(branch)
        {
            return Err(invalid());
        }

        Ok(Self {
            release: release.to_string(),
            build_release: build_release.to_string(),
            branch,
            timestamp,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.release, self.build_release)?;
        if let Some(branch) = &self.branch {
            write!(f, "-{}", branch)?;
        }
        if let Some(ts) = &self.timestamp {
            write!(f, ":{}", ts)?;
        }
        Ok(())
    }
}

fn is_dotted_sequence(text: &str) -> bool {
    !text.is_empty()
        && text
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Package FMRI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fmri {
    pub publisher: Option<String>,
    pub name: String,
    pub version: Option<Version>,
}

impl Fmri {
    /// Parse an FMRI, requiring a build version whenever a version is given
    pub fn parse(text: &str) -> Result<Self, FmriError> {
        let text = text.trim();
        let (publisher, rest) = if let Some(rest) = text.strip_prefix("pkg://") {
            match rest.split_once('/') {
                Some((publisher, rest)) if !publisher.is_empty() => {
                    (Some(publisher.to_string()), rest)
                }
                _ => return Err(FmriError::InvalidName(text.to_string())),
            }
        } else if let Some(rest) = text.strip_prefix("pkg:/") {
            (None, rest)
        } else {
            (None, text)
        };

        let (name, version) = match rest.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (rest, None),
        };

        if name.is_empty()
            || name.starts_with('/')
            || name.contains(|c: char| c.is_whitespace() || c == '@')
        {
            return Err(FmriError::InvalidName(text.to_string()));
        }

        let version = version.map(|v| Version::parse(text, v)).transpose()?;

        Ok(Self {
            publisher,
            name: name.to_string(),
            version,
        })
    }

    /// Parse an FMRI, dropping the version when it lacks a build release
    pub fn parse_lenient(text: &str) -> Result<Self, FmriError> {
        match Self::parse(text) {
            Err(FmriError::MissingBuildVersion(_)) => {
                Self::parse(text.split('@').next().unwrap_or(text))
            }
            other => other,
        }
    }

    /// Debian package name: `/` and `_` become `-`, lowercased
    pub fn debian_name(&self) -> String {
        debian_name(&self.name)
    }

    /// Last path component of the package name, lowercased
    pub fn base_name(&self) -> String {
        self.name
            .rsplit('/')
            .next()
            .unwrap_or(&self.name)
            .to_lowercase()
    }

    /// Release component of the version, if any
    pub fn release(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.release.as_str())
    }
}

/// Turn an IPS package name into a Debian package name
pub fn debian_name(name: &str) -> String {
    name.replace(['/', '_'], "-").to_lowercase()
}

impl fmt::Display for Fmri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.publisher {
            Some(publisher) => write!(f, "pkg://{}/{}", publisher, self.name)?,
            None => write!(f, "pkg:/{}", self.name)?,
        }
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}
