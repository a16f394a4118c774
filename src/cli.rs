use std::sync::OnceLock;
use clap::{
    Parser,
    builder::styling::{
        AnsiColor,
        Effects,
        Styles,
    },
};
use enum_dispatch::enum_dispatch;

use crate::{
    types::Result,
    commands::{
        acpype::Acpype,
        mdp::Mdp,
        hetatm::Hetatm,
        atoms::Atoms,
        progress::Progress,
        hist::Hist,
    },
};


pub fn get_style() -> Styles {
    static INSTANCE: OnceLock<Styles> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Styles::styled()
            .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
            .usage(AnsiColor::Green.on_default()   | Effects::BOLD)
            .literal(AnsiColor::Green.on_default() | Effects::BOLD)
            .placeholder(AnsiColor::BrightBlue.on_default())
            .error(AnsiColor::BrightRed.on_default())
            .valid(AnsiColor::BrightYellow.on_default())
    }).to_owned()
}


#[enum_dispatch]
pub trait OptProcess {
    fn process(&self) -> Result<()>;
}


#[enum_dispatch(OptProcess)]
#[derive(Debug, Parser)]
#[command(name = "mdkit",
            about = "A command-line toolkit to help GROMACS players run their MD workflows.",
            version,
            author = "mdkit developers",
            styles = get_style()
            )]
enum Opt {
    Acpype,

    Mdp,

    Hetatm,

    Atoms,

    Progress,

    Hist,
}


pub fn run() -> Result<()> {
    Opt::parse().process()
}
