//! Ranking score of analyzed candidates.

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::domain::FeatureVector;
use crate::processors::{PageSize, PixelBox};

/// Linear scoring model over the prior weight and the feature vector.
///
/// ```text
/// score = weight
///       + min(max_area_bonus, area_gain * area_ratio)
///       + wide_bonus          if w >= wide_fraction * W
///       + tall_bonus          if h >= tall_fraction * H
///       + ink_bonus           if ink_ratio in [min_ink_ratio, max_ink_ratio]
///       + min(max_large_component_bonus, large_component_gain * large_components)
///       + sparse_rows_bonus   if row_active < sparse_rows_limit
///       + density_bonus       if component_density in [min_density, max_density]
///       - dense_penalty       if component_density > dense_limit
///       - top_margin_penalty  if y < top_margin_fraction * H and h < top_margin_max_height_fraction * H
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scorer {
    /// Bonus per unit of box area over page area.
    pub area_gain: f64,
    /// Cap of the area bonus.
    pub max_area_bonus: f64,
    /// Boxes at least this fraction of page width get `wide_bonus`.
    pub wide_fraction: f64,
    /// Bonus for wide boxes.
    pub wide_bonus: f64,
    /// Boxes at least this fraction of page height get `tall_bonus`.
    pub tall_fraction: f64,
    /// Bonus for tall boxes.
    pub tall_bonus: f64,
    /// Lower end of the ink ratio band rewarded with `ink_bonus`.
    pub min_ink_ratio: f64,
    /// Upper end of the ink ratio band rewarded with `ink_bonus`.
    pub max_ink_ratio: f64,
    /// Bonus for an ink ratio inside the band.
    pub ink_bonus: f64,
    /// Bonus per large component.
    pub large_component_gain: f64,
    /// Cap of the large-component bonus.
    pub max_large_component_bonus: f64,
    /// Boxes with fewer active rows than this share get `sparse_rows_bonus`.
    pub sparse_rows_limit: f64,
    /// Bonus for boxes with blank rows, which running text rarely has.
    pub sparse_rows_bonus: f64,
    /// Lower end of the component density band rewarded with `density_bonus`.
    pub min_density: f64,
    /// Upper end of the component density band.
    pub max_density: f64,
    /// Bonus for a component density inside the band.
    pub density_bonus: f64,
    /// Component density above which `dense_penalty` applies.
    pub dense_limit: f64,
    /// Penalty for text-like component density.
    pub dense_penalty: f64,
    /// Boxes starting above this fraction of page height...
    pub top_margin_fraction: f64,
    /// ...and shorter than this fraction of it get `top_margin_penalty`.
    pub top_margin_max_height_fraction: f64,
    /// Penalty for short boxes in the page header.
    pub top_margin_penalty: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            area_gain: 4.0,
            max_area_bonus: 1.25,
            wide_fraction: 0.25,
            wide_bonus: 0.25,
            tall_fraction: 0.12,
            tall_bonus: 0.20,
            min_ink_ratio: 0.02,
            max_ink_ratio: 0.30,
            ink_bonus: 0.20,
            large_component_gain: 0.08,
            max_large_component_bonus: 0.45,
            sparse_rows_limit: 0.985,
            sparse_rows_bonus: 0.15,
            min_density: 1.0,
            max_density: 4.0,
            density_bonus: 0.2,
            dense_limit: 6.0,
            dense_penalty: 0.35,
            top_margin_fraction: 0.08,
            top_margin_max_height_fraction: 0.12,
            top_margin_penalty: 0.4,
        }
    }
}

impl Scorer {
    /// Scores one analyzed box.
    pub fn score(
        &self,
        weight: f64,
        features: &FeatureVector,
        bbox: &PixelBox,
        page: PageSize,
    ) -> f64 {
        let (page_w, page_h) = (f64::from(page.width), f64::from(page.height));
        let (w, h, y) = (
            f64::from(bbox.width),
            f64::from(bbox.height),
            f64::from(bbox.y),
        );

        let mut score = weight;
        score += (features.area_ratio * self.area_gain).min(self.max_area_bonus);
        if w >= self.wide_fraction * page_w {
            score += self.wide_bonus;
        }
        if h >= self.tall_fraction * page_h {
            score += self.tall_bonus;
        }
        if (self.min_ink_ratio..=self.max_ink_ratio).contains(&features.ink_ratio) {
            score += self.ink_bonus;
        }
        score += (self.large_component_gain * features.large_components as f64)
            .min(self.max_large_component_bonus);
        if features.row_active < self.sparse_rows_limit {
            score += self.sparse_rows_bonus;
        }
        if (self.min_density..=self.max_density).contains(&features.component_density) {
            score += self.density_bonus;
        }
        if features.component_density > self.dense_limit {
            score -= self.dense_penalty;
        }
        if y < self.top_margin_fraction * page_h && h < self.top_margin_max_height_fraction * page_h
        {
            score -= self.top_margin_penalty;
        }
        score
    }
}

impl ConfigValidator for Scorer {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("scoring.wide_fraction", self.wide_fraction)?;
        self.validate_ratio("scoring.tall_fraction", self.tall_fraction)?;
        self.validate_range("scoring.ink_ratio", self.min_ink_ratio, self.max_ink_ratio)?;
        self.validate_range("scoring.density", self.min_density, self.max_density)?;
        self.validate_ratio("scoring.top_margin_fraction", self.top_margin_fraction)?;
        self.validate_ratio(
            "scoring.top_margin_max_height_fraction",
            self.top_margin_max_height_fraction,
        )
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: PageSize = PageSize {
        width: 1000,
        height: 1000,
    };

    fn features() -> FeatureVector {
        FeatureVector {
            area_ratio: 0.2,
            ink_ratio: 0.1,
            medium_components: 20,
            large_components: 3,
            row_active: 0.9,
            row_std: 0.05,
            component_density: 2.0,
        }
    }

    #[test]
    fn test_every_bonus() {
        let bbox = PixelBox::new(200, 300, 500, 400);
        let score = Scorer::default().score(1.35, &features(), &bbox, PAGE);
        // 1.35 + 0.8 + 0.25 + 0.2 + 0.2 + 0.24 + 0.15 + 0.2
        assert!((score - 3.39).abs() < 1e-9);
    }

    #[test]
    fn test_caps_and_penalties() {
        let bbox = PixelBox::new(0, 10, 200, 100);
        let f = FeatureVector {
            area_ratio: 0.5,
            ink_ratio: 0.4,
            large_components: 20,
            row_active: 0.99,
            component_density: 7.0,
            ..features()
        };
        let score = Scorer::default().score(1.0, &f, &bbox, PAGE);
        // 1.0 + 1.25 (capped) + 0.45 (capped) - 0.35 - 0.4
        assert!((score - 1.95).abs() < 1e-9);
    }

    #[test]
    fn test_bonus_boundaries_are_inclusive() {
        let bbox = PixelBox::new(0, 500, 250, 120);
        let f = FeatureVector {
            area_ratio: 0.0,
            ink_ratio: 0.30,
            large_components: 0,
            row_active: 0.985,
            component_density: 4.0,
            ..features()
        };
        let score = Scorer::default().score(0.0, &f, &bbox, PAGE);
        // wide, tall, ink and density bonuses apply at their limits
        assert!((score - 0.85).abs() < 1e-9);
    }
}
