use std::fs::{File, OpenOptions};
use std::io::BufRead;
use std::path::Path;
use memmap2::MmapMut;

/// Gets a buffered reader over a trace file
pub fn get_reader(file: File) -> Result<impl BufRead, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 64 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file on unix systems, traces are read once from start to end
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Safety: the trace is only read, and isn't expected to change while it is replayed
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the trace file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(Cursor::new(m))
        }
    }
}

/// Maps an existing RAM image for reading and writing. Stores are written through to the file
///
/// The image must already be large enough for every address in the trace, it is never resized
pub fn open_ram(path: &Path) -> Result<MmapMut, String> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| format!("Couldn't open the RAM image at path {}: {e}", path.display()))?;
    // Safety: the simulator has exclusive use of the image for the length of the run
    unsafe { MmapMut::map_mut(&file) }.map_err(|e| format!("Couldn't memory map the RAM image: {e}"))
}
