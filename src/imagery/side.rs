/// Viewing direction of one image cut from a panorama.
///
/// Tags are the single characters used in destination file names:
/// front `f`, left `a`, back (rear) `r`, right `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Front,
    Left,
    Back,
    Right,
}

impl Side {
    /// All four directions, in the order records are produced.
    pub const fn all() -> [Self; 4] {
        [Self::Front, Self::Left, Self::Back, Self::Right]
    }
    pub const fn tag(&self) -> char {
        match self {
            Self::Front => 'f',
            Self::Left => 'a',
            Self::Back => 'r',
            Self::Right => 'b',
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl TryFrom<char> for Side {
    type Error = anyhow::Error;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::all()
            .into_iter()
            .find(|side| side.tag() == c)
            .ok_or_else(|| anyhow::anyhow!("invalid side tag: {}", c))
    }
}

impl serde::Serialize for Side {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.tag())
    }
}

impl<'de> serde::Deserialize<'de> for Side {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let c = char::deserialize(deserializer)?;
        Side::try_from(c).map_err(serde::de::Error::custom)
    }
}
