#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// A `;`-separated lot spreadsheet with accented, aliased headers, written
/// the way operators actually export them.
pub fn sample_lot_sheet(workspace: &TestWorkspace) -> PathBuf {
    workspace.write(
        "lotes.csv",
        "Etapa;Quadra;Lote;Valor do Imóvel (R$);Entrada\n\
         1;A;01;R$ 100.000,00;R$ 10.000,00\n\
         1;A;02;R$ 80.000,00;\n\
         ;;;;\n\
         2;B;03;120000;R$ 12.000,00\n",
    )
}

/// A secondary down-payment sheet keyed by unit, for merge imports.
pub fn sample_down_payment_sheet(workspace: &TestWorkspace) -> PathBuf {
    workspace.write(
        "entradas.csv",
        "LOTE;Sinal\n02;R$ 8.000,00\n03;R$ 9.000,00\n04;R$ 1.000,00\n",
    )
}
