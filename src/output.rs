use crate::board::Board;
use crate::report::Report;
use crate::simulation::SnapshotSink;
use crate::SimError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends `Turn <n>:` followed by the board to a text stream.
pub struct TurnWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> TurnWriter<W> {
    pub fn new(out: W) -> Self {
        TurnWriter {
            out: BufWriter::new(out),
        }
    }

    pub fn into_inner(self) -> Result<W, SimError> {
        self.out
            .into_inner()
            .map_err(|err| SimError::Io(err.into_error()))
    }
}

impl TurnWriter<File> {
    /// Truncates or creates the turns file.
    pub fn create(path: &Path) -> Result<Self, SimError> {
        Ok(TurnWriter::new(File::create(path)?))
    }
}

impl<W: Write> SnapshotSink for TurnWriter<W> {
    fn snapshot(&mut self, day: usize, board: &Board) -> Result<(), SimError> {
        writeln!(self.out, "Turn {day}:")?;
        write!(self.out, "{board}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Prints each board with ANSI colours.
pub struct EchoWriter<W: Write> {
    out: W,
}

impl<W: Write> EchoWriter<W> {
    pub fn new(out: W) -> Self {
        EchoWriter { out }
    }
}

impl<W: Write> SnapshotSink for EchoWriter<W> {
    fn snapshot(&mut self, day: usize, board: &Board) -> Result<(), SimError> {
        writeln!(self.out, "Turn {day}:")?;
        write!(self.out, "{}", board.colored())?;
        Ok(())
    }
}

/// Saves each board as `turn_<n>.svg` in a directory.
pub struct SvgWriter {
    dir: PathBuf,
}

impl SvgWriter {
    /// Creates the directory if needed.
    pub fn create(dir: &Path) -> Result<Self, SimError> {
        fs::create_dir_all(dir)?;
        Ok(SvgWriter {
            dir: dir.to_path_buf(),
        })
    }
}

impl SnapshotSink for SvgWriter {
    fn snapshot(&mut self, day: usize, board: &Board) -> Result<(), SimError> {
        let path = self.dir.join(format!("turn_{day}.svg"));
        svg::save(&path, &board.render_as_svg())?;
        log::trace!("wrote {}", path.display());
        Ok(())
    }
}

/// Hands every board to each sink in turn.
#[derive(Default)]
pub struct Sinks(Vec<Box<dyn SnapshotSink>>);

impl Sinks {
    pub fn push<S: SnapshotSink + 'static>(&mut self, sink: S) {
        self.0.push(Box::new(sink));
    }
}

impl SnapshotSink for Sinks {
    fn snapshot(&mut self, day: usize, board: &Board) -> Result<(), SimError> {
        for sink in self.0.iter_mut() {
            sink.snapshot(day, board)?;
        }
        Ok(())
    }
}

pub fn write_report(path: &Path, report: &Report) -> Result<(), SimError> {
    fs::write(path, report.to_string())?;
    Ok(())
}
