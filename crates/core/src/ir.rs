//! Read-only view of the disassembler's serialized IR.
//!
//! The harness never models the IR's internal graph. It needs exactly two
//! lookups to drive the hint protocol: resolve a symbol name to an address,
//! and classify an address as code or data. The disassembler is asked to
//! serialize its IR as JSON and this module indexes just enough of it.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Classification of the block covering an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Code,
    Data,
}

#[derive(Debug, Deserialize)]
struct IrDocument {
    #[serde(default)]
    modules: Vec<IrModule>,
}

#[derive(Debug, Deserialize)]
struct IrModule {
    #[serde(default)]
    symbols: Vec<IrSymbol>,
    #[serde(default)]
    blocks: Vec<IrBlock>,
}

#[derive(Debug, Deserialize)]
struct IrSymbol {
    name: String,
    address: u64,
}

#[derive(Debug, Deserialize)]
struct IrBlock {
    address: u64,
    #[serde(default)]
    size: u64,
    kind: BlockKind,
}

#[derive(Debug, Error)]
pub enum IrError {
    #[error("failed to read IR at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse IR at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Symbol and block index over one serialized IR artifact.
#[derive(Debug)]
pub struct IrIndex {
    symbols: HashMap<String, u64>,
    blocks: Vec<(u64, u64, BlockKind)>,
}

impl IrIndex {
    pub fn load(path: &Path) -> Result<IrIndex, IrError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| IrError::Read { path: path.display().to_string(), source })?;
        let doc: IrDocument = serde_json::from_str(&body)
            .map_err(|source| IrError::Parse { path: path.display().to_string(), source })?;

        let mut symbols = HashMap::new();
        let mut blocks = Vec::new();
        for module in doc.modules {
            for sym in module.symbols {
                symbols.insert(sym.name, sym.address);
            }
            for block in module.blocks {
                blocks.push((block.address, block.size, block.kind));
            }
        }
        Ok(IrIndex { symbols, blocks })
    }

    /// Address of the named symbol, if present in any module.
    pub fn find_symbol(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).copied()
    }

    /// Classification of the block whose span contains `address`.
    ///
    /// Zero-size blocks match exactly at their own address.
    pub fn classify(&self, address: u64) -> Option<BlockKind> {
        self.blocks
            .iter()
            .find(|(start, size, _)| {
                address >= *start && (address < start + size || (*size == 0 && address == *start))
            })
            .map(|(_, _, kind)| *kind)
    }
}
