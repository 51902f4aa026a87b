/// Network object type, carried in 4 bits by clone-create commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EntityType {
    Automobile = 0,
    Bike = 1,
    Boat = 2,
    Door = 3,
    Heli = 4,
    Object = 5,
    Ped = 6,
    Pickup = 7,
    PickupPlacement = 8,
    Plane = 9,
    Submarine = 10,
    Player = 11,
    Trailer = 12,
    Train = 13,
}

impl EntityType {
    pub const BITS: u32 = 4;

    pub fn from_bits(value: u8) -> Option<Self> {
        let entity_type = match value {
            0 => Self::Automobile,
            1 => Self::Bike,
            2 => Self::Boat,
            3 => Self::Door,
            4 => Self::Heli,
            5 => Self::Object,
            6 => Self::Ped,
            7 => Self::Pickup,
            8 => Self::PickupPlacement,
            9 => Self::Plane,
            10 => Self::Submarine,
            11 => Self::Player,
            12 => Self::Trailer,
            13 => Self::Train,
            _ => return None,
        };
        Some(entity_type)
    }

    pub fn to_bits(self) -> u8 {
        self as u8
    }

    pub fn is_vehicle(self) -> bool {
        matches!(
            self,
            Self::Automobile
                | Self::Bike
                | Self::Boat
                | Self::Heli
                | Self::Plane
                | Self::Submarine
                | Self::Trailer
                | Self::Train
        )
    }

    /// Peds and players
    pub fn is_ped(self) -> bool {
        matches!(self, Self::Ped | Self::Player)
    }
}
