pub mod mdp;
pub mod mdlog;
