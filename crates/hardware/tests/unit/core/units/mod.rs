
/// Map loader and translator.
pub mod mmu;
