pub mod milstein;
