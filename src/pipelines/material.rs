//! Material bind group: the texture slots the Phong shader samples.
//!
//! A mesh's textures are named by walking them in order with one running
//! counter per kind (`material.diffuse0`, `material.specular0`,
//! `material.diffuse1`, ...). [`MaterialSlots`] maps those names onto bind
//! group bindings. Textures whose name has no slot are skipped with a warning;
//! slots nothing was assigned to sample a placeholder.

use std::sync::Arc;

use crate::data_structures::{
    model::MaterialTexture,
    texture::{Texture, TextureKind, create_default_sampler},
};

pub const SAMPLER_BINDING: u32 = 4;

/// Slot names for textures of the given kinds, in order.
pub fn texture_slot_names<I>(kinds: I) -> Vec<String>
where
    I: IntoIterator<Item = TextureKind>,
{
    let mut diffuse = 0;
    let mut specular = 0;
    kinds
        .into_iter()
        .map(|kind| {
            let counter = match kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
            };
            let name = format!("material.{}{}", kind.slot_stem(), counter);
            *counter += 1;
            name
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSlot {
    pub name: String,
    pub binding: u32,
    pub kind: TextureKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSlots {
    slots: Vec<MaterialSlot>,
}

impl Default for MaterialSlots {
    /// Two diffuse and two specular maps, the sampler follows at [`SAMPLER_BINDING`].
    fn default() -> Self {
        let slot = |name: &str, binding, kind| MaterialSlot {
            name: name.to_string(),
            binding,
            kind,
        };
        Self {
            slots: vec![
                slot("material.diffuse0", 0, TextureKind::Diffuse),
                slot("material.diffuse1", 1, TextureKind::Diffuse),
                slot("material.specular0", 2, TextureKind::Specular),
                slot("material.specular1", 3, TextureKind::Specular),
            ],
        }
    }
}

impl MaterialSlots {
    pub fn iter(&self) -> impl Iterator<Item = &MaterialSlot> {
        self.slots.iter()
    }

    pub fn binding(&self, name: &str) -> Option<u32> {
        self.slots.iter().find(|s| s.name == name).map(|s| s.binding)
    }

    /// For every slot, the index into `kinds` of the texture that fills it, if any.
    pub fn assign(&self, mesh_name: &str, kinds: &[TextureKind]) -> Vec<(&MaterialSlot, Option<usize>)> {
        let names = texture_slot_names(kinds.iter().copied());
        for name in names.iter().filter(|name| self.binding(name).is_none()) {
            log::warn!("Mesh {mesh_name}: shader has no slot for {name}, texture skipped");
        }
        self.slots
            .iter()
            .map(|slot| (slot, names.iter().position(|name| *name == slot.name)))
            .collect()
    }
}

/// Layout, sampler and placeholders shared by every material bind group.
#[derive(Clone, Debug)]
pub struct MaterialLayout {
    pub layout: wgpu::BindGroupLayout,
    pub slots: MaterialSlots,
    sampler: wgpu::Sampler,
    white: Texture,
    black: Texture,
}

impl MaterialLayout {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let slots = MaterialSlots::default();
        let mut entries = slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            })
            .collect::<Vec<_>>();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &entries,
            label: Some("material_bind_group_layout"),
        });

        let placeholder = |kind: TextureKind, label| {
            Texture::create_solid(device, queue, kind.placeholder_colour(), label, kind.format())
        };

        Self {
            layout,
            slots,
            sampler: create_default_sampler(device),
            white: placeholder(TextureKind::Diffuse, "placeholder diffuse"),
            black: placeholder(TextureKind::Specular, "placeholder specular"),
        }
    }

    pub fn placeholder(&self, kind: TextureKind) -> &Texture {
        match kind {
            TextureKind::Diffuse => &self.white,
            TextureKind::Specular => &self.black,
        }
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        mesh_name: &str,
        textures: &[Arc<MaterialTexture>],
    ) -> wgpu::BindGroup {
        let kinds = textures.iter().map(|t| t.kind).collect::<Vec<_>>();
        let mut entries = self
            .slots
            .assign(mesh_name, &kinds)
            .into_iter()
            .map(|(slot, texture)| {
                let view = match texture {
                    Some(i) => &textures[i].texture.view,
                    None => &self.placeholder(slot.kind).view,
                };
                wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource: wgpu::BindingResource::TextureView(view),
                }
            })
            .collect::<Vec<_>>();
        entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &entries,
            label: Some(&format!("{mesh_name} material bind group")),
        })
    }
}
