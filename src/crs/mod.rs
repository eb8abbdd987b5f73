pub mod azimuthal;
