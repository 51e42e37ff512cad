use clap::ValueEnum;
use multipage_config::MergeMode;

/// How unit outputs are assembled after a build
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum MergeArg {
    /// Flatten every unit into the output root, sharing `assets/`
    #[value(name = "all")]
    All,

    /// One directory per page, each with its own `assets/`
    #[value(name = "page")]
    Page,

    /// One directory per strategy, each with its own `assets/`
    #[value(name = "strategy")]
    Strategy,
}

impl From<MergeArg> for MergeMode {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::All => MergeMode::All,
            MergeArg::Page => MergeMode::Page,
            MergeArg::Strategy => MergeMode::Strategy,
        }
    }
}
