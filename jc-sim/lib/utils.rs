//! Small conveniences shared by the script crate: complex literals, output
//! directories, and `.npz` archives.

use std::{ fs, io, path::Path };
use ndarray_npy::NpzWriter;

/// Create a [`Complex64`][num_complex::Complex64] from real and/or imaginary
/// parts.
///
/// ```ignore
/// c!(1.0)          // 1 + 0i
/// c!(i 2.0)        // 0 + 2i
/// c!(1.0, 2.0)     // 1 + 2i
/// ```
#[macro_export]
macro_rules! c {
    ( i $im:expr ) => {
        num_complex::Complex64::new(0.0, $im)
    };
    ( $re:expr, $im:expr ) => {
        num_complex::Complex64::new($re, $im)
    };
    ( $re:expr ) => {
        num_complex::Complex64::new($re, 0.0)
    };
}

/// Create a directory (and all parents) if it does not already exist.
///
/// Must be called in a function returning a `Result` whose error type can be
/// built from [`std::io::Error`].
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        $crate::utils::ensure_dir(&$dir)?;
    };
}

/// Write a collection of named arrays to a single `.npz` archive.
///
/// Must be called in a function returning a `Result` whose error type can be
/// built from both [`std::io::Error`] and [`ndarray_npy::WriteNpzError`].
///
/// ```ignore
/// write_npz!(
///     outdir.join("data.npz"),
///     arrays: {
///         "time" => &time,
///         "rho" => &rho,
///     }
/// );
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $filename:expr,
        arrays: { $( $name:expr => $arr:expr ),* $(,)? }
    ) => {
        {
            let mut _npz_ = $crate::utils::npz_writer(&$filename)?;
            $( _npz_.add_array($name, $arr)?; )*
            _npz_.finish()?;
        }
    };
}

pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> io::Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn npz_writer<P: AsRef<Path>>(filename: P) -> io::Result<NpzWriter<fs::File>> {
    let file = fs::File::create(filename)?;
    Ok(NpzWriter::new(file))
}

#[cfg(test)]
mod test {
    use ndarray as nd;

    fn roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join("jc_sim_utils_test");
        mkdir!(dir);
        let time: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 5);
        let amps: nd::Array1<num_complex::Complex64>
            = nd::array![c!(1.0), c!(i 1.0), c!(0.5, -0.5)];
        write_npz!(
            dir.join("data.npz"),
            arrays: {
                "time" => &time,
                "amps" => &amps,
            }
        );
        let file = std::fs::File::open(dir.join("data.npz"))?;
        let mut npz = ndarray_npy::NpzReader::new(file)?;
        let time_read: nd::Array1<f64> = npz.by_index(0)?;
        assert_eq!(time_read, time);
        Ok(())
    }

    #[test]
    fn npz_archive_is_written() {
        roundtrip().unwrap();
    }

    #[test]
    fn complex_literals() {
        assert_eq!(c!(2.0), num_complex::Complex64::new(2.0, 0.0));
        assert_eq!(c!(i 3.0), num_complex::Complex64::new(0.0, 3.0));
        assert_eq!(c!(1.0, -1.0), num_complex::Complex64::new(1.0, -1.0));
    }
}
