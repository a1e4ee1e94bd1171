use super::Vec2;

/// Raw mass properties of a shape at a given density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassData {
    /// Center of mass in the shape's local frame.
    pub center: Vec2,
    pub mass: f64,
    /// Rotational inertia about the center of mass.
    pub inertia: f64,
}

/// How a body's mass responds to impulses. "Infinite" means the inverse is
/// zero, so the corresponding velocity component never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassType {
    /// Finite mass and inertia (dynamic).
    Normal,
    /// Infinite mass and inertia (static).
    Infinite,
    /// Infinite linear mass, finite inertia: translation locked, rotation free.
    FixedLinearVelocity,
    /// Finite mass, infinite inertia: rotation locked, translation free.
    FixedAngularVelocity,
}

/// A body's mass state: scalar mass/inertia plus their inverses, the local
/// center of mass, and the mass type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass {
    pub mass_type: MassType,
    pub center: Vec2,
    pub mass: f64,
    pub inv_mass: f64,
    pub inertia: f64,
    pub inv_inertia: f64,
}

impl Mass {
    /// Build a mass from raw properties. Zero mass and zero inertia is
    /// treated as infinite (static).
    pub fn new(center: Vec2, mass: f64, inertia: f64) -> Self {
        if mass <= 0.0 && inertia <= 0.0 {
            return Self::infinite_at(center);
        }
        let mass_type = if mass <= 0.0 {
            MassType::FixedLinearVelocity
        } else if inertia <= 0.0 {
            MassType::FixedAngularVelocity
        } else {
            MassType::Normal
        };
        Self {
            mass_type,
            center,
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            inv_inertia: if inertia > 0.0 { 1.0 / inertia } else { 0.0 },
        }
    }

    pub fn infinite() -> Self {
        Self::infinite_at(Vec2::ZERO)
    }

    fn infinite_at(center: Vec2) -> Self {
        Self {
            mass_type: MassType::Infinite,
            center,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
        }
    }

    /// Re-classify this mass under a new type, zeroing the matching inverses.
    pub fn with_type(mut self, mass_type: MassType) -> Self {
        self.mass_type = mass_type;
        match mass_type {
            MassType::Normal => {
                self.inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
                self.inv_inertia = if self.inertia > 0.0 { 1.0 / self.inertia } else { 0.0 };
            }
            MassType::Infinite => {
                self.inv_mass = 0.0;
                self.inv_inertia = 0.0;
            }
            MassType::FixedLinearVelocity => {
                self.inv_mass = 0.0;
                self.inv_inertia = if self.inertia > 0.0 { 1.0 / self.inertia } else { 0.0 };
            }
            MassType::FixedAngularVelocity => {
                self.inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
                self.inv_inertia = 0.0;
            }
        }
        self
    }

    /// Combine the mass data of several fixtures about a common local frame.
    pub fn combine(parts: &[MassData]) -> Self {
        let mut mass = 0.0;
        let mut center = Vec2::ZERO;
        for p in parts {
            mass += p.mass;
            center += p.center * p.mass;
        }
        if mass > 0.0 {
            center /= mass;
        }
        let mut inertia = 0.0;
        for p in parts {
            // Parallel axis: shift each part's inertia to the combined center.
            inertia += p.inertia + p.mass * (p.center - center).length_squared();
        }
        Self::new(center, mass, inertia)
    }

    pub fn is_infinite(&self) -> bool {
        self.mass_type == MassType::Infinite
    }
}
