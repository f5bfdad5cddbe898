use std::collections::HashMap;
use std::iter::FromIterator;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::{fmt, fs, io};

use codespan_reporting::files::Error as CodespanError;

use lispy_syntax::error::Error as SyntaxError;
use lispy_syntax::node::{DataStr, Node};
use lispy_syntax::span::SourcePosition;

/// Index of a loaded unit's text within a `SourceLoader`
pub type FileId = usize;

#[derive(Debug)]
pub enum LoadError {
    NotFound,
    Io(io::Error),
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> LoadError {
        LoadError::Io(err)
    }
}

/// Source of unit text by unit name
pub trait UnitLoader {
    fn load_unit(&self, unit_name: &str) -> Result<String, LoadError>;
}

/// Loads units from an in-memory map of unit name to source text
#[derive(Clone, Debug, Default)]
pub struct DictLoader {
    units: HashMap<Box<str>, Box<str>>,
}

impl DictLoader {
    pub fn new() -> DictLoader {
        Self::default()
    }

    pub fn with_unit(mut self, unit_name: &str, text: &str) -> DictLoader {
        self.insert(unit_name, text);
        self
    }

    pub fn insert(&mut self, unit_name: &str, text: &str) {
        self.units.insert(unit_name.into(), text.into());
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for DictLoader {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> DictLoader {
        let mut loader = DictLoader::new();
        for (unit_name, text) in iter {
            loader.insert(unit_name, text);
        }

        loader
    }
}

impl UnitLoader for DictLoader {
    fn load_unit(&self, unit_name: &str) -> Result<String, LoadError> {
        self.units
            .get(unit_name)
            .map(|text| text.to_string())
            .ok_or(LoadError::NotFound)
    }
}

/// Loads units from files named after the unit in a list of search directories
///
/// Directories are searched in order and the first regular file found is used.
#[derive(Clone, Debug)]
pub struct FileSysLoader {
    search_dirs: Vec<PathBuf>,
}

impl FileSysLoader {
    pub fn new<I, P>(search_dirs: I) -> FileSysLoader
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FileSysLoader {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl UnitLoader for FileSysLoader {
    fn load_unit(&self, unit_name: &str) -> Result<String, LoadError> {
        for search_dir in &self.search_dirs {
            let path = search_dir.join(unit_name);

            if path.is_file() {
                log::debug!("reading unit `{}` from {}", unit_name, path.display());
                return Ok(fs::read_to_string(&path)?);
            }
        }

        Err(LoadError::NotFound)
    }
}

pub struct SourceFile {
    file_id: FileId,
    unit_name: DataStr,
    source: Arc<str>,
    parsed: Result<Node, Vec<SyntaxError>>,
}

impl SourceFile {
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn unit_name(&self) -> &DataStr {
        &self.unit_name
    }

    pub fn source(&self) -> &str {
        self.source.as_ref()
    }

    pub fn parsed(&self) -> Result<&Node, Vec<SyntaxError>> {
        match &self.parsed {
            Ok(node) => Ok(node),
            Err(errs) => Err(errs.clone()),
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "SourceFile({}, {})", self.file_id, self.unit_name)
    }
}

struct ReportableFile {
    unit_name: DataStr,
    source: Arc<str>,
    line_offsets: Vec<usize>,
}

impl ReportableFile {
    fn line_index(&self, offset: usize) -> usize {
        match self
            .line_offsets
            .binary_search_by(|line_start| line_start.cmp(&offset))
        {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    fn line_range(&self, line_index: usize) -> Option<Range<usize>> {
        let start = self.line_offsets.get(line_index)?;

        let end = self
            .line_offsets
            .get(line_index + 1)
            .cloned()
            .unwrap_or_else(|| self.source.len());

        Some(*start..end)
    }

    /// Converts a one-based line and character column to the byte range of that character
    ///
    /// A column just past the end of the line produces an empty range.
    fn byte_range_for(&self, line: u32, column: u32) -> Option<Range<usize>> {
        let line_range = self.line_range((line as usize).checked_sub(1)?)?;
        let line_text = &self.source[line_range.clone()];
        let char_index = (column as usize).checked_sub(1)?;

        match line_text.char_indices().nth(char_index) {
            Some((offset, c)) => {
                let start = line_range.start + offset;
                Some(start..start + c.len_utf8())
            }
            None if char_index == line_text.chars().count() => {
                Some(line_range.end..line_range.end)
            }
            None => None,
        }
    }
}

/// Loads units through a `UnitLoader` while retaining their text for diagnostics
pub struct SourceLoader {
    unit_loader: Box<dyn UnitLoader>,
    files: Vec<ReportableFile>,
}

impl SourceLoader {
    pub fn new(unit_loader: Box<dyn UnitLoader>) -> SourceLoader {
        SourceLoader {
            unit_loader,
            files: vec![],
        }
    }

    /// Loads and parses a unit by name
    pub fn load_unit(&mut self, unit_name: &str) -> Result<SourceFile, LoadError> {
        let text = self.unit_loader.load_unit(unit_name)?;
        Ok(self.load_string(unit_name, text))
    }

    /// Parses a caller-provided string as the named unit
    ///
    /// Reloading a unit with unchanged text reuses its existing file.
    pub fn load_string(&mut self, unit_name: &str, source: impl Into<Arc<str>>) -> SourceFile {
        use lispy_syntax::parser::data_from_str;

        let source: Arc<str> = source.into();
        let unit_name: DataStr = unit_name.into();

        let existing_file_id = self
            .file_id_for_unit(&unit_name)
            .filter(|file_id| self.files[*file_id].source == source);

        let file_id = match existing_file_id {
            Some(file_id) => file_id,
            None => {
                self.files.push(ReportableFile {
                    unit_name: unit_name.clone(),
                    line_offsets: codespan_reporting::files::line_starts(&source).collect(),
                    source: source.clone(),
                });

                self.files.len() - 1
            }
        };

        SourceFile {
            file_id,
            parsed: data_from_str(&unit_name, &source),
            unit_name,
            source,
        }
    }

    /// Returns the most recently loaded file for a unit
    pub fn file_id_for_unit(&self, unit_name: &str) -> Option<FileId> {
        self.files
            .iter()
            .rposition(|file| file.unit_name.as_ref() == unit_name)
    }

    /// Locates the byte range of the character at a source position
    pub fn locate(&self, pos: &SourcePosition) -> Option<(FileId, Range<usize>)> {
        if pos.is_builtin() {
            return None;
        }

        let file_id = self.file_id_for_unit(pos.unit_name())?;
        let range = self.files[file_id].byte_range_for(pos.line(), pos.column())?;

        Some((file_id, range))
    }

    /// Returns a `ReportableFiles` instance usable with `codespan-reporting`
    pub fn files(&self) -> ReportableFiles<'_> {
        ReportableFiles { files: &self.files }
    }
}

pub struct ReportableFiles<'a> {
    files: &'a [ReportableFile],
}

impl<'a> ReportableFiles<'a> {
    fn get_file(&self, file_id: FileId) -> Result<&'a ReportableFile, CodespanError> {
        self.files.get(file_id).ok_or(CodespanError::FileMissing)
    }
}

type CodespanResult<T> = Result<T, CodespanError>;

impl<'a> codespan_reporting::files::Files<'a> for ReportableFiles<'a> {
    type FileId = FileId;
    type Source = &'a str;
    type Name = DataStr;

    fn name(&self, file_id: FileId) -> CodespanResult<DataStr> {
        self.get_file(file_id).map(|f| f.unit_name.clone())
    }

    fn source(&self, file_id: FileId) -> CodespanResult<&'a str> {
        self.get_file(file_id).map(|f| f.source.as_ref())
    }

    fn line_index(&self, file_id: FileId, offset: usize) -> CodespanResult<usize> {
        self.get_file(file_id).map(|f| f.line_index(offset))
    }

    fn line_range(&self, file_id: FileId, line_index: usize) -> CodespanResult<Range<usize>> {
        self.get_file(file_id).and_then(|f| {
            f.line_range(line_index).ok_or(CodespanError::LineTooLarge {
                given: line_index,
                max: f.line_offsets.len(),
            })
        })
    }
}
