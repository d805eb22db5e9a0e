use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::id3v1;
use crate::id3v2;
use crate::Error;

pub fn get_tag<P: AsRef<Path>>(path: P, code_page: u16) -> Result<id3v2::Tag, Error> {
    let mut file = File::open(path.as_ref())?;
    id3v2::get(&mut file, code_page)
}

pub fn get_legacy_tag<P: AsRef<Path>>(path: P, code_page: u16) -> Result<id3v1::Id3v1Tag, Error> {
    let mut file = File::open(path.as_ref())?;
    id3v1::get(&mut file, code_page)
}

/// Rewrites the file at `path` with `tag` in front of its audio. The new file
/// is built next to the old one and only renamed over it once complete.
pub fn set_tag<P: AsRef<Path>>(path: P, tag: &id3v2::Tag) -> Result<(), Error> {
    let path = path.as_ref();

    let tmp_path = {
        let mut p = path.to_path_buf();
        let mut e = std::ffi::OsString::from(p.extension().unwrap_or_default());
        e.push("tmp");
        p.set_extension(e);
        p
    };

    {
        let mut file = File::open(path)?;
        // create temporary file to write to
        let mut tmp_file = BufWriter::new(File::create(&tmp_path)?);

        if let Err(x) = id3v2::set(tag, &mut file, &mut tmp_file) {
            // on failure, delete temporary file
            drop(tmp_file);
            std::fs::remove_file(&tmp_path)?;
            return Err(x);
        }

        if let Err(x) = tmp_file.into_inner() {
            let err = x.into_error();
            std::fs::remove_file(&tmp_path)?;
            return Err(Error::IOError(err));
        }
    }

    // replace original file
    std::fs::rename(&tmp_path, path)?;
    debug!("rewrote {}", path.display());
    Ok(())
}
