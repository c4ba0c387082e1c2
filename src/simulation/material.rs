/// Surface materials a room cell can be made of.
///
/// Each material pairs a reflection coefficient (fraction of pressure an
/// obstacle cell retains per tick in realism mode) with a damping factor
/// (per-tick attenuation of non-obstacle cells of that material).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    Air,
    Concrete,
    Drywall,
    Carpet,
    Furniture,
}

/// Number of defined materials; valid ids are `0..MATERIAL_COUNT`.
pub const MATERIAL_COUNT: usize = 5;

impl Material {
    /// Look up a material by id. Room files may carry digits 5-9, which
    /// have no table entry; those fall back to `Air` (no attenuation).
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Material::Concrete,
            2 => Material::Drywall,
            3 => Material::Carpet,
            4 => Material::Furniture,
            _ => Material::Air,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Material::Air => 0,
            Material::Concrete => 1,
            Material::Drywall => 2,
            Material::Carpet => 3,
            Material::Furniture => 4,
        }
    }

    /// Fraction of pressure an obstacle cell of this material reflects.
    pub fn reflection(self) -> f64 {
        match self {
            Material::Air => 1.0,
            Material::Concrete => 0.95,
            Material::Drywall => 0.85,
            Material::Carpet => 0.7,
            Material::Furniture => 0.8,
        }
    }

    /// Per-tick amplitude retention for non-obstacle cells. 1.0 means no
    /// attenuation; values below 1.0 bleed energy out of the field.
    pub fn damping(self) -> f64 {
        match self {
            Material::Air => 1.0,
            Material::Concrete => 0.995,
            Material::Drywall => 0.99,
            Material::Carpet => 0.98,
            Material::Furniture => 0.97,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Material::Air => "Air",
            Material::Concrete => "Concrete",
            Material::Drywall => "Drywall",
            Material::Carpet => "Carpet",
            Material::Furniture => "Furniture",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for id in 0..MATERIAL_COUNT as u8 {
            assert_eq!(Material::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_out_of_range_ids_fall_back_to_air() {
        for id in 5..=9u8 {
            assert_eq!(Material::from_id(id), Material::Air);
        }
        assert_eq!(Material::from_id(255), Material::Air);
    }

    #[test]
    fn test_air_is_lossless() {
        assert_eq!(Material::Air.reflection(), 1.0);
        assert_eq!(Material::Air.damping(), 1.0);
    }

    #[test]
    fn test_coefficients_in_range() {
        for id in 0..MATERIAL_COUNT as u8 {
            let m = Material::from_id(id);
            assert!(m.reflection() >= 0.0 && m.reflection() <= 1.0);
            assert!(m.damping() > 0.0 && m.damping() <= 1.0);
        }
    }

    #[test]
    fn test_concrete_reflects_more_than_carpet() {
        assert!(Material::Concrete.reflection() > Material::Carpet.reflection());
    }
}
