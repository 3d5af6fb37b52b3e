//! The fixed sampler set bound to every pixel program.
//!
//! Samplers live in group 1 at `binding = 1 + index`, in table order, so the
//! prelude can declare them once for every effect family.

/// First binding of the sampler block inside group 1.
pub const SAMPLER_BINDING_BASE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Address {
    Wrap,
    Clamp,
    Border,
}

impl Address {
    fn to_wgpu(self, border_supported: bool) -> wgpu::AddressMode {
        match self {
            Address::Wrap => wgpu::AddressMode::Repeat,
            Address::Clamp => wgpu::AddressMode::ClampToEdge,
            Address::Border if border_supported => wgpu::AddressMode::ClampToBorder,
            Address::Border => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// One entry of the sampler table.
#[derive(Debug, Clone, Copy)]
pub struct SamplerSpec {
    pub name: &'static str,
    filter: wgpu::FilterMode,
    address: [Address; 3],
    compare: Option<wgpu::CompareFunction>,
}

impl SamplerSpec {
    const fn new(name: &'static str, filter: wgpu::FilterMode, address: [Address; 3]) -> Self {
        Self { name, filter, address, compare: None }
    }

    pub fn is_comparison(&self) -> bool {
        self.compare.is_some()
    }

    fn uses_border(&self) -> bool {
        self.address.contains(&Address::Border)
    }

    fn descriptor(&self, border_supported: bool) -> wgpu::SamplerDescriptor<'static> {
        let [u, v, w] = self.address.map(|a| a.to_wgpu(border_supported));
        wgpu::SamplerDescriptor {
            label: Some(self.name),
            address_mode_u: u,
            address_mode_v: v,
            address_mode_w: w,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter: self.filter,
            compare: self.compare,
            border_color: (border_supported && self.uses_border())
                .then_some(wgpu::SamplerBorderColor::OpaqueWhite),
            ..Default::default()
        }
    }
}

use wgpu::FilterMode::{Linear, Nearest};
use Address::{Border, Clamp, Wrap};

/// Sampler table, in binding order.
pub const SAMPLER_SPECS: [SamplerSpec; 15] = [
    SamplerSpec::new("linear_wrap", Linear, [Wrap, Wrap, Wrap]),
    SamplerSpec::new("linear_clamp", Linear, [Clamp, Clamp, Clamp]),
    SamplerSpec::new("linear_border", Linear, [Border, Border, Border]),
    SamplerSpec::new("point_wrap", Nearest, [Wrap, Wrap, Wrap]),
    SamplerSpec::new("point_clamp", Nearest, [Clamp, Clamp, Clamp]),
    SamplerSpec::new("linear_wrap_clamp_wrap", Linear, [Wrap, Clamp, Wrap]),
    SamplerSpec::new("linear_wrap_border_wrap", Linear, [Wrap, Border, Wrap]),
    SamplerSpec::new("linear_clamp_wrap_wrap", Linear, [Clamp, Wrap, Wrap]),
    SamplerSpec::new("linear_border_wrap_wrap", Linear, [Border, Wrap, Wrap]),
    SamplerSpec::new("dynamic_wrap", Linear, [Wrap, Wrap, Wrap]),
    SamplerSpec::new("linear_wrap_no_bias", Linear, [Wrap, Wrap, Wrap]),
    SamplerSpec::new("linear_clamp_no_bias", Linear, [Clamp, Clamp, Clamp]),
    SamplerSpec::new("point_wrap_no_bias", Nearest, [Wrap, Wrap, Wrap]),
    SamplerSpec::new("point_clamp_no_bias", Nearest, [Clamp, Clamp, Clamp]),
    SamplerSpec {
        name: "depth",
        filter: Linear,
        address: [Border, Border, Border],
        compare: Some(wgpu::CompareFunction::LessEqual),
    },
];

/// Created samplers, index-aligned with [`SAMPLER_SPECS`].
#[derive(Debug, Clone)]
pub struct SamplerSet {
    samplers: Vec<wgpu::Sampler>,
}

impl SamplerSet {
    pub fn new(device: &wgpu::Device) -> Self {
        let border_supported = device
            .features()
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        if !border_supported {
            tracing::warn!(
                "Device lacks clamp-to-border; border samplers fall back to clamp-to-edge"
            );
        }
        let samplers = SAMPLER_SPECS
            .iter()
            .map(|spec| device.create_sampler(&spec.descriptor(border_supported)))
            .collect();
        Self { samplers }
    }

    /// Bind group layout entries for the sampler block.
    pub fn layout_entries() -> impl Iterator<Item = wgpu::BindGroupLayoutEntry> {
        SAMPLER_SPECS.iter().enumerate().map(|(i, spec)| {
            let kind = if spec.is_comparison() {
                wgpu::SamplerBindingType::Comparison
            } else if spec.filter == Linear {
                wgpu::SamplerBindingType::Filtering
            } else {
                wgpu::SamplerBindingType::NonFiltering
            };
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING_BASE + i as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(kind),
                count: None,
            }
        })
    }

    /// Bind group entries referencing each sampler at its fixed binding.
    pub fn bind_entries(&self) -> impl Iterator<Item = wgpu::BindGroupEntry<'_>> {
        self.samplers.iter().enumerate().map(|(i, sampler)| wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING_BASE + i as u32,
            resource: wgpu::BindingResource::Sampler(sampler),
        })
    }
}
