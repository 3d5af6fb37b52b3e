//! Compiling and reflecting the shipped card shaders.

mod common;

use common::shipped_config;
use divfx::cards::{Family, VariantSet};
use divfx::shader::{Stage, TextureSlotMap, VERTEX_ENTRY_POINT};

#[test]
fn every_shipped_variant_compiles() {
    let set = divfx::compile_variants(&shipped_config()).unwrap();
    assert_eq!(set.names(), ["shaper", "elder", "crusader", "redeemer", "hunter", "warlord"]);

    let vertex = set.vertex();
    assert_eq!(vertex.entry_point(), VERTEX_ENTRY_POINT);
    assert_eq!(vertex.stage(), Stage::Vertex);
    for compiled in set.variants() {
        assert_eq!(compiled.variant.pixel.stage(), Stage::Fragment);
        assert!(!compiled.variant.bytecode().is_empty());
    }
}

#[test]
fn draw2d_variants_reflect_all_sixteen_slots() {
    let set = divfx::compile_variants(&shipped_config()).unwrap();
    let shaper = &set.variants()[0];
    assert_eq!(shaper.family, Family::Draw2D);

    let slots = TextureSlotMap::reflect(&shaper.variant.pixel);
    assert_eq!(slots.len(), 16);
    assert_eq!(slots.slot("tex"), Some(0));
    assert_eq!(slots.slot("mask_tex"), Some(1));
    assert_eq!(slots.slot("influence_layer_0_tex"), Some(6));
    assert_eq!(slots.slot("muddle_tex"), Some(14));
    assert_eq!(slots.slot("background_tex"), Some(15));
    assert_eq!(slots.slot("noise_map"), None);
}

#[test]
fn atlas_variants_reflect_paper_and_noise() {
    let set = divfx::compile_variants(&shipped_config()).unwrap();
    for compiled in &set.variants()[2..] {
        assert_eq!(compiled.family, Family::Atlas);
        let slots = TextureSlotMap::reflect(&compiled.variant.pixel);
        let expected = TextureSlotMap::from_pairs([("tex", 0), ("noise_map", 1)]);
        assert_eq!(slots, expected, "{}", compiled.variant.name);
    }
}

#[test]
fn shipped_programs_compile_deterministically() {
    let compiler = divfx::build_compiler(&shipped_config()).unwrap();
    let a = VariantSet::compile(&compiler).unwrap();
    let b = VariantSet::compile(&compiler).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.variants().iter().zip(b.variants()) {
        assert_eq!(x.variant.bytecode(), y.variant.bytecode());
    }
}

#[test]
fn missing_prelude_is_an_error() {
    let mut config = shipped_config();
    config.prelude_file = "does_not_exist.wgsl".into();
    assert!(matches!(divfx::build_compiler(&config), Err(divfx::Error::Io(_))));
}
