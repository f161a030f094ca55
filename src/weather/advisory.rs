//! Temperature → clothing advice, condition code → label.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutfitTier {
    ExtremeCold,
    Cold,
    Cool,
    Warm,
    Hot,
}

impl OutfitTier {
    /// Half-open bands: `<0`, `[0,10)`, `[10,20)`, `[20,25)`, `>=25`.
    pub fn for_temperature(celsius: f64) -> Self {
        if celsius < 0.0 {
            OutfitTier::ExtremeCold
        } else if celsius < 10.0 {
            OutfitTier::Cold
        } else if celsius < 20.0 {
            OutfitTier::Cool
        } else if celsius < 25.0 {
            OutfitTier::Warm
        } else {
            OutfitTier::Hot
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OutfitTier::ExtremeCold => "Bundle up",
            OutfitTier::Cold => "Winter layers",
            OutfitTier::Cool => "Cool and comfortable",
            OutfitTier::Warm => "Pleasantly warm",
            OutfitTier::Hot => "Summer heat",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OutfitTier::ExtremeCold => {
                "Bitterly cold. Wear a heavy down jacket, thermal base layers, a scarf, gloves and a beanie. Dress in layers."
            }
            OutfitTier::Cold => {
                "Cold out. A coat, sweater and long trousers are recommended. Mornings and evenings are colder, so pack hand warmers."
            }
            OutfitTier::Cool => {
                "Mild and slightly cool. Light long sleeves, a trench coat or knitwear work well. Bring a thin jacket just in case."
            }
            OutfitTier::Warm => "Warm. Short sleeves with a light shirt or thin long sleeves. Good weather for being outdoors.",
            OutfitTier::Hot => {
                "Hot. Breathable short sleeves, shorts or skirts. Use sun protection and drink plenty of water."
            }
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            OutfitTier::ExtremeCold => "❄️",
            OutfitTier::Cold => "🧣",
            OutfitTier::Cool => "🧥",
            OutfitTier::Warm => "👕",
            OutfitTier::Hot => "☀️",
        }
    }
}

/// Advice block returned with a weather report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutfitAdvice {
    pub tier: OutfitTier,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl From<OutfitTier> for OutfitAdvice {
    fn from(tier: OutfitTier) -> Self {
        Self {
            tier,
            title: tier.title(),
            description: tier.description(),
            icon: tier.icon(),
        }
    }
}

/// WMO weather interpretation code bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
    PartlyCloudy,
}

impl WeatherCondition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::Cloudy,
            45..=48 => WeatherCondition::Fog,
            51..=55 => WeatherCondition::Drizzle,
            61..=65 => WeatherCondition::Rain,
            71..=77 => WeatherCondition::Snow,
            80..=82 => WeatherCondition::Showers,
            c if c >= 95 => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::PartlyCloudy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Showers => "Showers",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::PartlyCloudy => "Partly cloudy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bands() {
        let cases = [
            (-5.0, OutfitTier::ExtremeCold),
            (-0.1, OutfitTier::ExtremeCold),
            (0.0, OutfitTier::Cold),
            (9.9, OutfitTier::Cold),
            (10.0, OutfitTier::Cool),
            (19.9, OutfitTier::Cool),
            (20.0, OutfitTier::Warm),
            (24.9, OutfitTier::Warm),
            (25.0, OutfitTier::Hot),
            (35.0, OutfitTier::Hot),
        ];
        for (temp, tier) in cases {
            assert_eq!(OutfitTier::for_temperature(temp), tier, "{}", temp);
        }
    }

    #[test]
    fn test_advice_serializes_tier_name() {
        let advice = OutfitAdvice::from(OutfitTier::ExtremeCold);
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["tier"], "extreme-cold");
        assert_eq!(json["icon"], "❄️");
    }

    #[test]
    fn test_condition_bands() {
        use WeatherCondition::*;
        let cases = [
            (0, Clear),
            (1, Cloudy),
            (3, Cloudy),
            (4, PartlyCloudy),
            (45, Fog),
            (48, Fog),
            (53, Drizzle),
            (56, PartlyCloudy),
            (61, Rain),
            (65, Rain),
            (66, PartlyCloudy),
            (71, Snow),
            (77, Snow),
            (81, Showers),
            (85, PartlyCloudy),
            (95, Thunderstorm),
            (99, Thunderstorm),
            (-1, PartlyCloudy),
        ];
        for (code, condition) in cases {
            assert_eq!(WeatherCondition::from_code(code), condition, "code {}", code);
        }
        assert_eq!(Showers.label(), "Showers");
    }
}
