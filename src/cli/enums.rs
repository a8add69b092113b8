//! CLI value enums.

use clap::ValueEnum;

use crate::capture::VideoNorm;

/// Signal norm names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Norm {
    #[default]
    Ntsc,
    Pal,
    Secam,
    #[value(alias = "ntsc_jp")]
    NtscJp,
}

impl From<Norm> for VideoNorm {
    fn from(n: Norm) -> Self {
        match n {
            Norm::Ntsc => VideoNorm::Ntsc,
            Norm::Pal => VideoNorm::Pal,
            Norm::Secam => VideoNorm::Secam,
            Norm::NtscJp => VideoNorm::NtscJp,
        }
    }
}
