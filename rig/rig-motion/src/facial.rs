//! Facial pose baking
//!
//! Mixamo faces come with a catalog of blend shapes (`Smile_Left`,
//! `MouthOpen`, ...). A preset is a weight assignment over that catalog; it
//! is baked by mixing the weighted shapes into a new shape channel named
//! after the preset and then zeroing the weights again.

use log::debug;

use crate::scene::{Mesh, Scene};

/// A named weight assignment over shape channels
#[derive(Debug, Clone, PartialEq)]
pub struct FacialPreset {
    /// Name of the baked channel
    pub name: String,
    /// Source channel weights; channels missing on the mesh are skipped
    pub weights: Vec<(String, f32)>,
    /// Rebuild the channel when the mesh already has one with this name
    pub replace_existing: bool,
}

impl FacialPreset {
    pub fn new(name: impl Into<String>, weights: &[(&str, f32)]) -> Self {
        Self {
            name: name.into(),
            weights: weights
                .iter()
                .map(|(channel, weight)| ((*channel).to_string(), *weight))
                .collect(),
            replace_existing: false,
        }
    }

    /// Rebuild an existing channel of the same name instead of keeping it
    pub fn replacing(mut self) -> Self {
        self.replace_existing = true;
        self
    }

    /// Configured weight of a source channel (0 when not part of the preset)
    pub fn weight(&self, channel: &str) -> f32 {
        self.weights
            .iter()
            .find(|(name, _)| name == channel)
            .map_or(0.0, |(_, weight)| *weight)
    }

    /// Bake this preset into a shape channel on the mesh
    ///
    /// Returns whether a channel was added.
    pub fn bake(&self, mesh: &mut Mesh) -> bool {
        self.set_weights(mesh, true);

        if self.replace_existing && mesh.remove_shape_channel(&self.name) {
            debug!("Replacing shape channel '{}' on '{}'", self.name, mesh.name);
        }
        let added = mesh.shape_channel(&self.name).is_none();
        if added {
            mesh.add_shape_from_mix(self.name.clone());
        }

        self.set_weights(mesh, false);
        added
    }

    fn set_weights(&self, mesh: &mut Mesh, on: bool) {
        for (name, weight) in &self.weights {
            if let Some(channel) = mesh.shape_channel_mut(name) {
                channel.value = if on { *weight } else { 0.0 };
            }
        }
    }
}

/// Ordered presets and the meshes they are baked on
#[derive(Debug, Clone, PartialEq)]
pub struct FacialPoseTable {
    pub meshes: Vec<String>,
    pub presets: Vec<FacialPreset>,
}

impl Default for FacialPoseTable {
    /// The viseme set used for Mixamo characters
    fn default() -> Self {
        let presets = vec![
            FacialPreset::new(
                "etc",
                &[
                    ("Smile_Right", 0.3),
                    ("Smile_Left", 0.3),
                    ("UpperLipUp_Right", 0.4),
                    ("UpperLipUp_Left", 0.4),
                    ("LowerLipDown_Right", 0.8),
                    ("LowerLipDown_Left", 0.8),
                    ("MouthUp", 0.1),
                ],
            ),
            FacialPreset::new(
                "U",
                &[
                    ("LowerLipOut", 1.0),
                    ("UpperLipOut", 1.0),
                    ("MouthWhistle_NarrowAdjust_Right", 1.0),
                    ("MouthWhistle_NarrowAdjust_Left", 1.0),
                    ("Midmouth_Left", 0.4),
                    ("Midmouth_Right", 0.4),
                    ("MouthNarrow_Left", 0.6),
                    ("MouthNarrow_Right", 0.6),
                ],
            ),
            FacialPreset::new(
                "MBP",
                &[
                    ("Smile_Left", 0.4),
                    ("Smile_Right", 0.4),
                    ("Frown_Left", 0.5),
                    ("Frown_Right", 0.5),
                ],
            ),
            FacialPreset::new(
                "O",
                &[
                    ("LowerLipOut", 0.4),
                    ("UpperLipOut", 0.4),
                    ("MouthWhistle_NarrowAdjust_Right", 0.5),
                    ("MouthWhistle_NarrowAdjust_Left", 0.4),
                    ("MouthOpen", 0.4),
                    ("Midmouth_Left", 0.5),
                    ("Midmouth_Right", 0.5),
                ],
            ),
            FacialPreset::new(
                "AI",
                &[
                    ("Smile_Left", 0.3),
                    ("Smile_Right", 0.3),
                    ("MouthOpen", 0.5),
                    ("MouthUp", 0.2),
                ],
            )
            .replacing(),
            FacialPreset::new(
                "E",
                &[
                    ("Smile_Left", 0.1),
                    ("Smile_Right", 0.1),
                    ("UpperLipUp_Right", 0.3),
                    ("UpperLipUp_Left", 0.3),
                    ("LowerLipDown_Right", 1.0),
                    ("LowerLipDown_Left", 1.0),
                    ("MouthUp", 0.2),
                ],
            ),
            FacialPreset::new(
                "WQ",
                &[
                    ("MouthNarrow_Left", 1.0),
                    ("MouthNarrow_Right", 1.0),
                    ("LowerLipOut", 1.0),
                    ("UpperLipOut", 1.0),
                    ("MouthWhistle_NarrowAdjust_Right", 1.0),
                    ("MouthWhistle_NarrowAdjust_Left", 1.0),
                    ("Midmouth_Left", 0.1),
                    ("Midmouth_Right", 0.1),
                ],
            )
            .replacing(),
            FacialPreset::new(
                "FV",
                &[
                    ("Jaw_Up", 1.0),
                    ("LowerLipIn", 1.0),
                    ("MouthOpen", 0.3),
                    ("JawBackward", 0.2),
                ],
            )
            .replacing(),
            FacialPreset::new(
                "L",
                &[
                    ("Smile_Left", 0.4),
                    ("Smile_Right", 0.4),
                    ("MouthNarrow_Left", 0.5),
                    ("MouthNarrow_Right", 0.5),
                    ("MouthOpen", 0.4),
                    ("MouthUp", 0.4),
                    ("TongueUp", 0.6),
                ],
            )
            .replacing(),
            FacialPreset::new("rest", &[]),
        ];

        Self {
            meshes: ["Body", "Beards", "Eyelashes", "Moustaches", "default"]
                .into_iter()
                .map(String::from)
                .collect(),
            presets,
        }
    }
}

impl FacialPoseTable {
    pub fn preset(&self, name: &str) -> Option<&FacialPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Zero every shape weight, then bake every preset in order
    pub fn apply_to_mesh(&self, mesh: &mut Mesh) -> usize {
        for channel in &mut mesh.shape_channels {
            channel.value = 0.0;
        }
        self.presets
            .iter()
            .filter(|preset| preset.bake(mesh))
            .count()
    }

    /// Bake the presets on every listed mesh that has shape channels
    ///
    /// Returns the number of meshes processed.
    pub fn apply(&self, scene: &mut Scene) -> usize {
        let mut processed = 0;
        for mesh in scene
            .meshes
            .iter_mut()
            .filter(|m| self.meshes.contains(&m.name) && !m.shape_channels.is_empty())
        {
            let added = self.apply_to_mesh(mesh);
            debug!("Baked {added} facial poses on '{}'", mesh.name);
            processed += 1;
        }
        processed
    }
}
