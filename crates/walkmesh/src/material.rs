// material.rs - surface materials and their walkability

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum SurfaceMaterial {
    #[default]
    Undefined = 0,
    Dirt = 1,
    Obscuring = 2,
    Grass = 3,
    Stone = 4,
    Wood = 5,
    Water = 6,
    NonWalk = 7,
    Transparent = 8,
    Carpet = 9,
    Metal = 10,
    Puddles = 11,
    Swamp = 12,
    Mud = 13,
    Leaves = 14,
    Lava = 15,
    BottomlessPit = 16,
    DeepWater = 17,
    Door = 18,
    NonWalkGrass = 19,
    Trigger = 30,
}

/// Walkability by material id for the contiguous range 0..=19
const WALKABLE: [bool; 20] = [
    false, // Undefined
    true,  // Dirt
    false, // Obscuring
    true,  // Grass
    true,  // Stone
    true,  // Wood
    true,  // Water
    false, // NonWalk
    false, // Transparent
    true,  // Carpet
    true,  // Metal
    true,  // Puddles
    true,  // Swamp
    true,  // Mud
    true,  // Leaves
    false, // Lava
    false, // BottomlessPit
    false, // DeepWater
    true,  // Door
    false, // NonWalkGrass
];

impl SurfaceMaterial {
    pub const ALL: [SurfaceMaterial; 21] = [
        Self::Undefined,
        Self::Dirt,
        Self::Obscuring,
        Self::Grass,
        Self::Stone,
        Self::Wood,
        Self::Water,
        Self::NonWalk,
        Self::Transparent,
        Self::Carpet,
        Self::Metal,
        Self::Puddles,
        Self::Swamp,
        Self::Mud,
        Self::Leaves,
        Self::Lava,
        Self::BottomlessPit,
        Self::DeepWater,
        Self::Door,
        Self::NonWalkGrass,
        Self::Trigger,
    ];

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0..=19 => Some(Self::ALL[id as usize]),
            30 => Some(Self::Trigger),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn walkable(self) -> bool {
        match self {
            Self::Trigger => true,
            other => WALKABLE[other.id() as usize],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Dirt => "dirt",
            Self::Obscuring => "obscuring",
            Self::Grass => "grass",
            Self::Stone => "stone",
            Self::Wood => "wood",
            Self::Water => "water",
            Self::NonWalk => "nonwalk",
            Self::Transparent => "transparent",
            Self::Carpet => "carpet",
            Self::Metal => "metal",
            Self::Puddles => "puddles",
            Self::Swamp => "swamp",
            Self::Mud => "mud",
            Self::Leaves => "leaves",
            Self::Lava => "lava",
            Self::BottomlessPit => "bottomless_pit",
            Self::DeepWater => "deep_water",
            Self::Door => "door",
            Self::NonWalkGrass => "nonwalk_grass",
            Self::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for SurfaceMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for material in SurfaceMaterial::ALL {
            assert_eq!(SurfaceMaterial::from_id(material.id()), Some(material));
        }
        assert_eq!(SurfaceMaterial::from_id(20), None);
        assert_eq!(SurfaceMaterial::from_id(29), None);
        assert_eq!(SurfaceMaterial::from_id(31), None);
    }

    #[test]
    fn test_walkable_set() {
        let walkable: Vec<_> = SurfaceMaterial::ALL
            .iter()
            .copied()
            .filter(|m| m.walkable())
            .collect();
        assert_eq!(
            walkable,
            vec![
                SurfaceMaterial::Dirt,
                SurfaceMaterial::Grass,
                SurfaceMaterial::Stone,
                SurfaceMaterial::Wood,
                SurfaceMaterial::Water,
                SurfaceMaterial::Carpet,
                SurfaceMaterial::Metal,
                SurfaceMaterial::Puddles,
                SurfaceMaterial::Swamp,
                SurfaceMaterial::Mud,
                SurfaceMaterial::Leaves,
                SurfaceMaterial::Door,
                SurfaceMaterial::Trigger,
            ]
        );
    }
}
