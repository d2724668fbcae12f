use std::cmp::Ordering;

/// A dependency version as it appears in a catalog or repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub original: String,
    pub kind: VersionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionKind {
    Semantic(semver::Version),
    Numeric(Vec<u32>),
    Snapshot,
    Unknown,
}

const UNSTABLE_MARKERS: &[&str] = &[
    "alpha", "beta", "rc", "snapshot", "dev", "m1", "m2", "m3", "eap", "preview", "canary",
];

impl Version {
    pub fn parse(version: &str) -> Self {
        let kind = if let Ok(v) = semver::Version::parse(version) {
            VersionKind::Semantic(v)
        } else if version.ends_with("-SNAPSHOT") {
            VersionKind::Snapshot
        } else if let Some(numeric) = Self::parse_numeric(version) {
            VersionKind::Numeric(numeric)
        } else {
            VersionKind::Unknown
        };

        Version {
            original: version.to_string(),
            kind,
        }
    }

    fn parse_numeric(version: &str) -> Option<Vec<u32>> {
        let numbers = version
            .split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()?;

        if numbers.is_empty() { None } else { Some(numbers) }
    }

    pub fn is_stable(&self) -> bool {
        let lower = self.original.to_lowercase();
        if UNSTABLE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return false;
        }

        match &self.kind {
            VersionKind::Semantic(v) => v.pre.is_empty(),
            VersionKind::Snapshot => false,
            _ => true,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.kind, &other.kind) {
            (VersionKind::Semantic(a), VersionKind::Semantic(b)) => a.cmp(b),
            (VersionKind::Numeric(a), VersionKind::Numeric(b)) => a
                .iter()
                .zip(b)
                .map(|(av, bv)| av.cmp(bv))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (VersionKind::Semantic(a), VersionKind::Numeric(b)) => {
                compare_mixed(&[a.major, a.minor, a.patch], b).then(Ordering::Less)
            }
            (VersionKind::Numeric(a), VersionKind::Semantic(b)) => {
                compare_mixed(a, &[b.major, b.minor, b.patch]).then(Ordering::Greater)
            }
            (VersionKind::Snapshot, VersionKind::Snapshot) => self.original.cmp(&other.original),
            (VersionKind::Snapshot, _) => Ordering::Less,
            (_, VersionKind::Snapshot) => Ordering::Greater,
            _ => self.original.cmp(&other.original),
        }
    }
}

// Compares dotted components, treating missing trailing parts as zero.
fn compare_mixed<A, B>(a: &[A], b: &[B]) -> Ordering
where
    A: Copy + Into<u64>,
    B: Copy + Into<u64>,
{
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let av: u64 = a.get(i).map(|v| (*v).into()).unwrap_or(0);
            let bv: u64 = b.get(i).map(|v| (*v).into()).unwrap_or(0);
            av.cmp(&bv)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

pub struct VersionComparator;

impl VersionComparator {
    /// Latest version in `versions`, optionally ignoring pre-releases.
    pub fn latest(versions: &[String], stable_only: bool) -> Option<String> {
        versions
            .iter()
            .map(|v| Version::parse(v))
            .filter(|v| !stable_only || v.is_stable())
            .max()
            .map(|v| v.original)
    }

    /// Whether `candidate` is newer than `current`.
    pub fn is_newer(candidate: &str, current: &str) -> bool {
        Version::parse(candidate) > Version::parse(current)
    }
}
