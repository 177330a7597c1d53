//! Data model for the sequence viewer.
//!
//! This module contains the data structures for:
//! - Sequences and their stable identities
//! - The sequence registry
//! - Shared view state (rotation)
//!
//! Sequences are opaque ordered sets of single-character symbols; nothing in
//! here validates that they are real nucleotides or amino acids.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use rand::Rng;
use tracing::debug;

/// Opaque, stable identifier of a registered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl SequenceId {
    /// Draws a fresh identifier from the thread-local RNG.
    fn random() -> Self {
        Self(rand::rng().random())
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Preferred rendering mode for a DNA sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultLayout {
    /// Linear map (recognized, drawn circularly for now)
    Linear,
    /// Circular map
    Circular,
}

/// What kind of strand a sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Nucleotide sequence, with an optional preferred layout
    Dna { default_layout: Option<DefaultLayout> },
    /// Amino acid sequence
    Protein,
}

impl SequenceKind {
    /// DNA without a preferred layout.
    pub const DNA: SequenceKind = SequenceKind::Dna { default_layout: None };

    /// Preferred layout, if any. Proteins never carry one.
    pub fn default_layout(&self) -> Option<DefaultLayout> {
        match self {
            SequenceKind::Dna { default_layout } => *default_layout,
            SequenceKind::Protein => None,
        }
    }

    pub fn is_protein(&self) -> bool {
        matches!(self, SequenceKind::Protein)
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceKind::Dna { .. } => write!(f, "dna"),
            SequenceKind::Protein => write!(f, "protein"),
        }
    }
}

/// A sequence as handed to the registry, before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInput {
    pub kind: SequenceKind,
    pub symbols: String,
    pub title: Option<String>,
}

impl SequenceInput {
    /// Creates a DNA input with no preferred layout and no title.
    pub fn dna(symbols: impl Into<String>) -> Self {
        Self {
            kind: SequenceKind::DNA,
            symbols: symbols.into(),
            title: None,
        }
    }

    /// Creates a protein input with no title.
    pub fn protein(symbols: impl Into<String>) -> Self {
        Self {
            kind: SequenceKind::Protein,
            symbols: symbols.into(),
            title: None,
        }
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the preferred layout. Ignored for proteins.
    pub fn with_layout(mut self, layout: DefaultLayout) -> Self {
        if let SequenceKind::Dna { default_layout } = &mut self.kind {
            *default_layout = Some(layout);
        }
        self
    }
}

/// Represents a single registered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Stable identity, assigned at registration
    pub id: SequenceId,
    /// DNA or protein
    pub kind: SequenceKind,
    /// The symbols, one char each, in biological order
    pub symbols: String,
    /// Optional display label
    pub title: Option<String>,
}

impl Sequence {
    fn from_input(id: SequenceId, input: SequenceInput) -> Self {
        Self {
            id,
            kind: input.kind,
            symbols: input.symbols,
            title: input.title,
        }
    }

    /// Returns the number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.chars().count()
    }

    /// Returns true if the sequence has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Gets the symbol at a specific position.
    pub fn symbol_at(&self, pos: usize) -> Option<char> {
        self.symbols.chars().nth(pos)
    }

    /// Label to show next to the diagram: the title, or the id.
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} {}", self.kind, self.id),
        }
    }
}

/// Holds the sequences being displayed, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceRegistry {
    sequences: Vec<Sequence>,
}

impl SequenceRegistry {
    /// Registers the given inputs, assigning each a fresh unique id.
    pub fn register(inputs: impl IntoIterator<Item = SequenceInput>) -> Self {
        let mut taken = HashSet::new();
        let sequences = inputs
            .into_iter()
            .map(|input| {
                let mut id = SequenceId::random();
                while !taken.insert(id) {
                    id = SequenceId::random();
                }
                Sequence::from_input(id, input)
            })
            .collect();
        Self { sequences }
    }

    /// All sequences, in registration order.
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Identifiers, in registration order.
    pub fn ids(&self) -> Vec<SequenceId> {
        self.sequences.iter().map(|s| s.id).collect()
    }

    /// Gets a sequence by id.
    pub fn get(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.id == id)
    }

    /// Returns the number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if no sequence is registered.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Replaces the entry matching `id` with `transform` applied to it.
    ///
    /// The entry keeps its id whatever the transform returns. An unknown id
    /// leaves the registry untouched and returns `false`.
    pub fn update<F>(&mut self, id: SequenceId, transform: F) -> bool
    where
        F: FnOnce(Sequence) -> Sequence,
    {
        let Some(slot) = self.sequences.iter_mut().find(|s| s.id == id) else {
            debug!(%id, "update for unknown sequence ignored");
            return false;
        };
        let current = slot.clone();
        let mut updated = transform(current);
        updated.id = id;
        *slot = updated;
        true
    }
}

/// Per-viewer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    /// Angle in radians shared by every diagram
    pub rotation: f64,
}

/// Shared handle on the view state: written by the interaction controller,
/// read by the scene composer. Single-threaded by construction.
pub type SharedViewState = Rc<RefCell<ViewState>>;
