//! Clarus annotation core: maps variants onto transcript models and reports Sequence Ontology
//! consequences with HGVS coding and protein nomenclature.

pub mod error;

pub mod amino_acid;
pub mod annotate;
pub mod biotype;
pub mod cli;
pub mod codon;
pub mod config;
pub mod consequence;
pub mod fasta;
pub mod hgvs;
pub mod mapping;
pub mod mirna;
pub mod normalize;
pub mod positional;
pub mod sequence;
pub mod strand;
pub mod transcript;
pub mod variant;

#[cfg(test)]
mod fixtures;
