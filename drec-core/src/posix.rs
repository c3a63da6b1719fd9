use core::fmt;

/// A point in time, as milliseconds since the Unix epoch.
///
/// This is the representation records store and exchange: JSON carries it as
/// an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Posix(i64);

impl Posix {
    /// The Unix epoch itself.
    pub const EPOCH: Posix = Posix(0);

    /// Builds a `Posix` from milliseconds since the epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Posix(millis)
    }

    /// Milliseconds since the epoch.
    pub const fn millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Posix {
    fn from(millis: i64) -> Self {
        Posix(millis)
    }
}

impl fmt::Display for Posix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "jiff02")]
impl From<jiff::Timestamp> for Posix {
    fn from(ts: jiff::Timestamp) -> Self {
        Posix(ts.as_millisecond())
    }
}

#[cfg(feature = "jiff02")]
impl TryFrom<Posix> for jiff::Timestamp {
    type Error = jiff::Error;

    fn try_from(posix: Posix) -> Result<Self, Self::Error> {
        jiff::Timestamp::from_millisecond(posix.0)
    }
}
