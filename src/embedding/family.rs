/// Backbone architectures; each fixes the embedding width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Family {
    #[value(name = "resnet18")]
    Resnet18,
    #[value(name = "resnet34")]
    Resnet34,
    #[value(name = "resnet50")]
    Resnet50,
    #[value(name = "resnet101")]
    Resnet101,
    #[value(name = "resnet152")]
    Resnet152,
}

impl Family {
    /// Width of the pooled feature layer.
    pub const fn width(&self) -> usize {
        match self {
            Self::Resnet18 | Self::Resnet34 => 512,
            Self::Resnet50 | Self::Resnet101 | Self::Resnet152 => 2048,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Resnet18 => write!(f, "resnet18"),
            Self::Resnet34 => write!(f, "resnet34"),
            Self::Resnet50 => write!(f, "resnet50"),
            Self::Resnet101 => write!(f, "resnet101"),
            Self::Resnet152 => write!(f, "resnet152"),
        }
    }
}

/// Where backbone inference runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Device {
    Cpu,
    Accelerator,
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(Family::Resnet18.width(), 512);
        assert_eq!(Family::Resnet34.width(), 512);
        assert_eq!(Family::Resnet50.width(), 2048);
        assert_eq!(Family::Resnet101.width(), 2048);
        assert_eq!(Family::Resnet152.width(), 2048);
    }

    #[test]
    fn names_match_cli_values() {
        use clap::ValueEnum;
        for family in Family::value_variants() {
            let value = family.to_possible_value().unwrap();
            assert_eq!(value.get_name(), family.to_string());
        }
    }
}
