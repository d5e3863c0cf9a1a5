//! Test data builders for creating test objects

use vmc_retarget::BoneSample;

/// Builder for creating test BoneSamples
pub struct SampleBuilder {
    bone: String,
    position: [f64; 3],
    rotation: [f64; 4],
}

impl SampleBuilder {
    pub fn new(bone: &str) -> Self {
        Self {
            bone: bone.to_string(),
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Rotation of `degrees` about a unit axis
    pub fn rotated(mut self, axis: [f64; 3], degrees: f64) -> Self {
        let (s, c) = (degrees.to_radians() / 2.0).sin_cos();
        self.rotation = [axis[0] * s, axis[1] * s, axis[2] * s, c];
        self
    }

    pub fn quaternion(mut self, q: [f64; 4]) -> Self {
        self.rotation = q;
        self
    }

    pub fn build(self) -> BoneSample {
        BoneSample::new(self.bone, self.position, self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_builder() {
        let sample = SampleBuilder::new("Hips")
            .position(0.0, 1.0, 0.0)
            .rotated([0.0, 1.0, 0.0], 180.0)
            .build();

        assert_eq!(sample.bone_id, "Hips");
        assert_eq!(sample.position, [0.0, 1.0, 0.0]);
        assert!((sample.rotation[1] - 1.0).abs() < 1e-12);
    }
}
