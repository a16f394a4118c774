pub mod acpype;
pub mod mdp;
pub mod hetatm;
pub mod atoms;
pub mod progress;
pub mod hist;
