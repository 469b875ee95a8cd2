// src/units.rs

/// 1 Hartree in eV.
pub const HA_TO_EV: f64 = 27.211386245988;
/// 1 Bohr in Angstrom.
pub const BOHR_TO_ANG: f64 = 0.529177210903;
/// 1 Ha/Bohr^3 in GPa.
pub const HA_BOHR3_TO_GPA: f64 = 29421.033;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyUnit {
    #[default]
    Ev,
    Ha,
}

impl EnergyUnit {
    /// Factor converting a value in Hartree to this unit.
    pub fn from_hartree(self) -> f64 {
        match self {
            EnergyUnit::Ev => HA_TO_EV,
            EnergyUnit::Ha => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnergyUnit::Ev => "eV",
            EnergyUnit::Ha => "Ha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceUnit {
    #[default]
    EvPerAng,
    HaPerBohr,
}

impl ForceUnit {
    /// Factor converting a value in Ha/Bohr to this unit.
    pub fn from_ha_bohr(self) -> f64 {
        match self {
            ForceUnit::EvPerAng => HA_TO_EV / BOHR_TO_ANG,
            ForceUnit::HaPerBohr => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ForceUnit::EvPerAng => "eV/Ang",
            ForceUnit::HaPerBohr => "Ha/Bohr",
        }
    }
}

pub fn bohr_to_ang(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v *= BOHR_TO_ANG;
    }
}
