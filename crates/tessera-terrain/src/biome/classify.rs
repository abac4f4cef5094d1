//! Height/temperature/rainfall decision table.

/// Default normalised sea level.
pub const DEFAULT_SEA_LEVEL: f32 = 0.2;
/// Default temperature loss per unit of height above sea level.
pub const DEFAULT_COOLING_FACTOR: f32 = 0.4;
/// Normalised height above which highland becomes snowy peaks.
pub const SNOW_LINE: f32 = 0.85;

/// Discrete biome label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BiomeType {
    DeepOcean,
    Ocean,
    Grassland,
    TemperateForest,
    Jungle,
    Desert,
    Mountains,
    SnowyPeaks,
}

impl BiomeType {
    pub const COUNT: usize = 8;

    pub const ALL: [BiomeType; Self::COUNT] = [
        BiomeType::DeepOcean,
        BiomeType::Ocean,
        BiomeType::Grassland,
        BiomeType::TemperateForest,
        BiomeType::Jungle,
        BiomeType::Desert,
        BiomeType::Mountains,
        BiomeType::SnowyPeaks,
    ];

    /// Position in [`BiomeType::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            BiomeType::DeepOcean => "deep_ocean",
            BiomeType::Ocean => "ocean",
            BiomeType::Grassland => "grassland",
            BiomeType::TemperateForest => "temperate_forest",
            BiomeType::Jungle => "jungle",
            BiomeType::Desert => "desert",
            BiomeType::Mountains => "mountains",
            BiomeType::SnowyPeaks => "snowy_peaks",
        }
    }

    pub const fn is_water(self) -> bool {
        matches!(self, BiomeType::DeepOcean | BiomeType::Ocean)
    }
}

impl std::fmt::Display for BiomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse height band, independent of climate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeographyType {
    DeepOcean,
    Ocean,
    LowAltitude,
    HighAltitude,
}

/// Upper bound of the lowland band: halfway between sea level and 1.
#[inline]
fn lowland_ceiling(sea_level: f32) -> f32 {
    sea_level + (1.0 - sea_level) * 0.5
}

/// Height band of a normalised height.
#[inline]
pub fn classify_geography(height: f32, sea_level: f32) -> GeographyType {
    if height <= sea_level * 0.5 {
        GeographyType::DeepOcean
    } else if height <= sea_level {
        GeographyType::Ocean
    } else if height <= lowland_ceiling(sea_level) {
        GeographyType::LowAltitude
    } else {
        GeographyType::HighAltitude
    }
}

/// Classify a point. Total over all inputs, including NaN (which lands on the
/// last branch of each comparison chain).
#[inline]
pub fn classify(height: f32, temperature: f32, rainfall: f32, sea_level: f32) -> BiomeType {
    match classify_geography(height, sea_level) {
        GeographyType::DeepOcean => BiomeType::DeepOcean,
        GeographyType::Ocean => BiomeType::Ocean,
        GeographyType::LowAltitude => {
            if temperature < 0.3 {
                if rainfall < 0.5 {
                    BiomeType::Grassland
                } else {
                    BiomeType::TemperateForest
                }
            } else if temperature < 0.6 {
                if rainfall < 0.4 {
                    BiomeType::Grassland
                } else {
                    BiomeType::Jungle
                }
            } else if temperature < 0.8 {
                BiomeType::Grassland
            } else {
                BiomeType::Desert
            }
        }
        GeographyType::HighAltitude => {
            if height < SNOW_LINE {
                BiomeType::Mountains
            } else {
                BiomeType::SnowyPeaks
            }
        }
    }
}

/// Adjust a raw temperature for elevation.
///
/// Under water the temperature scales with depth; above sea level it drops
/// linearly with height above the sea scaled by `cooling_factor`. Clamped to `[0, 1]`.
#[inline]
pub fn adjust_temperature(raw: f32, height: f32, sea_level: f32, cooling_factor: f32) -> f32 {
    let adjusted = if height <= sea_level {
        raw * height
    } else {
        raw - (height - sea_level) * cooling_factor
    };
    adjusted.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const SEA: f32 = DEFAULT_SEA_LEVEL;

    #[test]
    fn test_height_bands() {
        assert_eq!(classify(0.05, 0.5, 0.5, SEA), BiomeType::DeepOcean);
        assert_eq!(classify(0.1, 0.5, 0.5, SEA), BiomeType::DeepOcean, "band edge is inclusive");
        assert_eq!(classify(0.15, 0.5, 0.5, SEA), BiomeType::Ocean);
        assert_eq!(classify(0.2, 0.5, 0.5, SEA), BiomeType::Ocean);
        assert_eq!(classify(0.7, 0.5, 0.5, SEA), BiomeType::Mountains);
        assert_eq!(classify(0.9, 0.5, 0.5, SEA), BiomeType::SnowyPeaks);
    }

    #[test]
    fn test_lowland_climate_table() {
        let h = 0.4;
        assert_eq!(classify(h, 0.1, 0.2, SEA), BiomeType::Grassland);
        assert_eq!(classify(h, 0.1, 0.8, SEA), BiomeType::TemperateForest);
        assert_eq!(classify(h, 0.5, 0.3, SEA), BiomeType::Grassland);
        assert_eq!(classify(h, 0.5, 0.6, SEA), BiomeType::Jungle);
        assert_eq!(classify(h, 0.7, 0.9, SEA), BiomeType::Grassland);
        assert_eq!(classify(h, 0.95, 0.1, SEA), BiomeType::Desert);
    }

    #[test]
    fn test_classify_is_total() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut seen = [false; BiomeType::COUNT];
        for _ in 0..10_000 {
            let biome = classify(
                rng.random_range(-0.5..1.5),
                rng.random_range(-0.5..1.5),
                rng.random_range(-0.5..1.5),
                rng.random_range(0.0..1.0),
            );
            seen[biome.index()] = true;
        }
        assert!(seen.iter().all(|&s| s), "every biome is reachable: {seen:?}");

        let nan = f32::NAN;
        assert_eq!(classify(nan, nan, nan, nan), BiomeType::SnowyPeaks);
    }

    #[test]
    fn test_geography_bands() {
        assert_eq!(classify_geography(0.0, SEA), GeographyType::DeepOcean);
        assert_eq!(classify_geography(0.18, SEA), GeographyType::Ocean);
        assert_eq!(classify_geography(0.59, SEA), GeographyType::LowAltitude);
        assert_eq!(classify_geography(0.61, SEA), GeographyType::HighAltitude);
    }

    #[test]
    fn test_temperature_underwater_scales_with_depth() {
        assert!((adjust_temperature(0.8, 0.1, SEA, DEFAULT_COOLING_FACTOR) - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_cools_with_altitude() {
        let low = adjust_temperature(0.8, 0.3, SEA, DEFAULT_COOLING_FACTOR);
        let high = adjust_temperature(0.8, 0.9, SEA, DEFAULT_COOLING_FACTOR);
        assert!((low - 0.76).abs() < 1e-6);
        assert!((high - 0.52).abs() < 1e-6);
        assert_eq!(adjust_temperature(0.1, 1.0, SEA, 2.0), 0.0, "clamped at zero");
        assert_eq!(adjust_temperature(1.5, 0.5, SEA, 0.0), 1.0, "clamped at one");
    }
}
