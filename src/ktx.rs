//! A reader for texture data stored in the KTX container format (v1.1).
//!
//! Parsing is split from GL upload so the byte-level plumbing stays
//! testable without a context. Only the texture kinds the demos actually
//! render are uploadable: 2D textures and 2D texture arrays with
//! uncompressed payloads. Cube maps, 3D textures and compressed payloads
//! are rejected with a clear error instead of being half-supported.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt};
use gl::types::*;

use crate::errors::{check_gl, Result};

/// The 12-byte file identifier every KTX file starts with.
pub const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const ENDIANNESS_NATIVE: u32 = 0x0403_0201;
const ENDIANNESS_REVERSED: u32 = 0x0102_0304;

/// Caps on the declared sizes of variable-length sections, so a corrupt
/// header cannot ask for a multi-gigabyte allocation.
const MAX_KEY_VALUE_BYTES: u32 = 16 << 20;
const MAX_LEVEL_BYTES: u32 = 256 << 20;

/// The fixed-size portion of a KTX header, with the fields already brought
/// into host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub gl_type: u32,
    pub gl_type_size: u32,
    pub gl_format: u32,
    pub gl_internal_format: u32,
    pub gl_base_internal_format: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_elements: u32,
    pub faces: u32,
    pub mip_levels: u32,
}

/// The texture targets this reader knows how to upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Texture2d,
    Texture2dArray,
}

/// A parsed KTX file: the header plus one payload blob per stored mip
/// level. For array textures a blob covers all layers of that level.
#[derive(Debug, Clone)]
pub struct KtxFile {
    pub header: Header,
    pub levels: Vec<Vec<u8>>,
}

/// A texture created from a KTX file.
#[derive(Debug, Clone, Copy)]
pub struct KtxTexture {
    pub name: GLuint,
    pub target: GLenum,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
}

impl Header {
    /// Classifies the texture, rejecting the kinds the demos never use.
    pub fn target(&self) -> Result<Target> {
        if self.gl_type == 0 {
            bail!("compressed KTX payloads are not supported");
        }

        if self.faces > 1 {
            bail!("cube map KTX files are not supported");
        }

        if self.depth > 0 {
            bail!("3D KTX textures are not supported");
        }

        if self.width == 0 || self.height == 0 {
            bail!("1D KTX textures are not supported");
        }

        if self.array_elements > 0 {
            Ok(Target::Texture2dArray)
        } else {
            Ok(Target::Texture2d)
        }
    }

    /// Number of mip levels stored in the file. A `mip_levels` of zero means
    /// a single stored level with mipmap generation left to the loader.
    pub fn stored_levels(&self) -> u32 {
        self.mip_levels.max(1)
    }
}

/// Number of levels in a full mipmap chain for the given base extent.
pub fn mip_levels_for(width: u32, height: u32) -> u32 {
    let mut size = width.max(height);
    let mut levels = 0;
    while size != 0 {
        levels += 1;
        size >>= 1;
    }

    levels.max(1)
}

/// Parses a KTX byte stream into header and per-level payloads.
pub fn parse<R: Read>(mut reader: R) -> Result<KtxFile> {
    let mut identifier = [0u8; 12];
    reader.read_exact(&mut identifier)?;
    if identifier != IDENTIFIER {
        bail!("not a KTX file (bad identifier)");
    }

    let marker = reader.read_u32::<NativeEndian>()?;
    let swap = match marker {
        ENDIANNESS_NATIVE => false,
        ENDIANNESS_REVERSED => true,
        other => bail!("bad KTX endianness marker 0x{:08x}", other),
    };

    let header = Header {
        gl_type: word(&mut reader, swap)?,
        gl_type_size: word(&mut reader, swap)?,
        gl_format: word(&mut reader, swap)?,
        gl_internal_format: word(&mut reader, swap)?,
        gl_base_internal_format: word(&mut reader, swap)?,
        width: word(&mut reader, swap)?,
        height: word(&mut reader, swap)?,
        depth: word(&mut reader, swap)?,
        array_elements: word(&mut reader, swap)?,
        faces: word(&mut reader, swap)?,
        mip_levels: word(&mut reader, swap)?,
    };

    if header.width == 0 {
        bail!("KTX header declares zero width");
    }

    let key_value_bytes = word(&mut reader, swap)?;
    if key_value_bytes > MAX_KEY_VALUE_BYTES {
        bail!("KTX key/value section of {} bytes exceeds the limit", key_value_bytes);
    }
    skip(&mut reader, key_value_bytes as usize)?;

    let mut levels = Vec::with_capacity(header.stored_levels() as usize);
    for level in 0..header.stored_levels() {
        let image_size = word(&mut reader, swap)?;
        if image_size == 0 || image_size > MAX_LEVEL_BYTES {
            bail!("KTX level {} declares an implausible size of {} bytes", level, image_size);
        }

        let mut data = vec![0u8; image_size as usize];
        reader.read_exact(&mut data)?;
        if swap {
            swap_texels(&mut data, header.gl_type_size);
        }
        levels.push(data);

        // Each level is padded so the next one starts 4-byte aligned.
        skip(&mut reader, ((4 - (image_size as usize & 3)) & 3) as usize)?;
    }

    Ok(KtxFile { header, levels })
}

/// Parses a KTX file from disk.
pub fn open<P: AsRef<Path>>(path: P) -> Result<KtxFile> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| format_err!("cannot open `{}`: {}", path.display(), err))?;
    parse(BufReader::new(file))
}

/// Reads a KTX file from disk and uploads it as a GL texture.
pub unsafe fn load<P: AsRef<Path>>(path: P) -> Result<KtxTexture> {
    let file = open(path)?;
    upload(&file)
}

/// Uploads a parsed KTX file into a freshly generated texture object.
///
/// When the file stores a single level but asks for mipmap generation
/// (`mip_levels == 0`), a full chain is allocated and generated. The texture
/// is left bound to its target on return.
pub unsafe fn upload(file: &KtxFile) -> Result<KtxTexture> {
    let header = &file.header;
    let target = header.target()?;
    if file.levels.len() != header.stored_levels() as usize {
        bail!(
            "KTX payload has {} levels, header declares {}",
            file.levels.len(),
            header.stored_levels()
        );
    }

    let generate_mipmaps = header.mip_levels == 0;
    let total_levels = if generate_mipmaps {
        mip_levels_for(header.width, header.height)
    } else {
        header.mip_levels
    };

    let mut name = 0;
    gl::GenTextures(1, &mut name);

    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);

    let gl_target = match target {
        Target::Texture2d => {
            gl::BindTexture(gl::TEXTURE_2D, name);
            gl::TexStorage2D(
                gl::TEXTURE_2D,
                total_levels as GLsizei,
                header.gl_internal_format,
                header.width as GLsizei,
                header.height as GLsizei,
            );
            for (level, data) in file.levels.iter().enumerate() {
                let (w, h) = level_extent(header, level as u32);
                gl::TexSubImage2D(
                    gl::TEXTURE_2D,
                    level as GLint,
                    0,
                    0,
                    w as GLsizei,
                    h as GLsizei,
                    header.gl_format,
                    header.gl_type,
                    data.as_ptr() as *const _,
                );
            }
            gl::TEXTURE_2D
        }
        Target::Texture2dArray => {
            gl::BindTexture(gl::TEXTURE_2D_ARRAY, name);
            gl::TexStorage3D(
                gl::TEXTURE_2D_ARRAY,
                total_levels as GLsizei,
                header.gl_internal_format,
                header.width as GLsizei,
                header.height as GLsizei,
                header.array_elements as GLsizei,
            );
            for (level, data) in file.levels.iter().enumerate() {
                let (w, h) = level_extent(header, level as u32);
                gl::TexSubImage3D(
                    gl::TEXTURE_2D_ARRAY,
                    level as GLint,
                    0,
                    0,
                    0,
                    w as GLsizei,
                    h as GLsizei,
                    header.array_elements as GLsizei,
                    header.gl_format,
                    header.gl_type,
                    data.as_ptr() as *const _,
                );
            }
            gl::TEXTURE_2D_ARRAY
        }
    };

    if generate_mipmaps && total_levels > 1 {
        gl::GenerateMipmap(gl_target);
    }

    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 4);
    check_gl()?;

    Ok(KtxTexture {
        name,
        target: gl_target,
        width: header.width,
        height: header.height,
        levels: total_levels,
    })
}

fn level_extent(header: &Header, level: u32) -> (u32, u32) {
    ((header.width >> level).max(1), (header.height >> level).max(1))
}

fn word<R: Read>(reader: &mut R, swap: bool) -> Result<u32> {
    let value = reader.read_u32::<NativeEndian>()?;
    Ok(if swap { value.swap_bytes() } else { value })
}

fn skip<R: Read>(reader: &mut R, mut bytes: usize) -> Result<()> {
    let mut scratch = [0u8; 256];
    while bytes > 0 {
        let chunk = bytes.min(scratch.len());
        reader.read_exact(&mut scratch[..chunk])?;
        bytes -= chunk;
    }

    Ok(())
}

/// Reorders payload bytes of a reversed-endianness file into host order,
/// respecting the texel element size from the header.
fn swap_texels(data: &mut [u8], gl_type_size: u32) {
    match gl_type_size {
        2 => {
            for pair in data.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }
        4 => {
            for quad in data.chunks_exact_mut(4) {
                quad.swap(0, 3);
                quad.swap(1, 2);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Builder {
        header: [u32; 12],
        levels: Vec<Vec<u8>>,
        swapped: bool,
    }

    impl Builder {
        /// RGBA8, one array layer, one face. Field order matches the file
        /// layout starting at `gl_type`.
        fn rgba8(width: u32, height: u32, mip_levels: u32) -> Builder {
            Builder {
                header: [0x1401, 1, 0x1908, 0x8058, 0x1908, width, height, 0, 0, 1, mip_levels, 0],
                levels: Vec::new(),
                swapped: false,
            }
        }

        fn header_field(mut self, index: usize, value: u32) -> Builder {
            self.header[index] = value;
            self
        }

        fn level(mut self, data: Vec<u8>) -> Builder {
            self.levels.push(data);
            self
        }

        fn swapped(mut self) -> Builder {
            self.swapped = true;
            self
        }

        fn build(&self) -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(&IDENTIFIER);
            self.put(&mut out, ENDIANNESS_NATIVE);
            for &field in &self.header {
                self.put(&mut out, field);
            }
            for level in &self.levels {
                self.put(&mut out, level.len() as u32);
                out.extend_from_slice(level);
                out.resize((out.len() + 3) & !3, 0);
            }
            out
        }

        fn put(&self, out: &mut Vec<u8>, value: u32) {
            let value = if self.swapped { value.swap_bytes() } else { value };
            out.extend_from_slice(&value.to_ne_bytes());
        }
    }

    #[test]
    fn parses_a_two_level_rgba8_file() {
        let bytes = Builder::rgba8(4, 4, 2)
            .level(vec![0xAA; 64])
            .level(vec![0xBB; 16])
            .build();

        let file = parse(&bytes[..]).unwrap();
        assert_eq!(file.header.width, 4);
        assert_eq!(file.header.height, 4);
        assert_eq!(file.header.mip_levels, 2);
        assert_eq!(file.header.gl_internal_format, 0x8058);
        assert_eq!(file.levels.len(), 2);
        assert_eq!(file.levels[0], vec![0xAA; 64]);
        assert_eq!(file.levels[1], vec![0xBB; 16]);
        assert_eq!(file.header.target().unwrap(), Target::Texture2d);
    }

    #[test]
    fn parses_reversed_endianness_headers() {
        let bytes = Builder::rgba8(8, 2, 1).level(vec![1; 64]).swapped().build();

        let file = parse(&bytes[..]).unwrap();
        assert_eq!(file.header.width, 8);
        assert_eq!(file.header.height, 2);
        assert_eq!(file.header.gl_type, 0x1401);
    }

    #[test]
    fn reorders_texels_of_reversed_files() {
        // One R32F texel. gl_type_size of 4 asks for a 4-byte element swap.
        let texel = 1.5f32.to_bits().swap_bytes().to_ne_bytes().to_vec();
        let bytes = Builder::rgba8(1, 1, 1)
            .header_field(0, 0x1406)
            .header_field(1, 4)
            .header_field(2, 0x1903)
            .header_field(3, 0x822E)
            .level(texel)
            .swapped()
            .build();

        let file = parse(&bytes[..]).unwrap();
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&file.levels[0]);
        assert_eq!(f32::from_bits(u32::from_ne_bytes(raw)), 1.5);
    }

    #[test]
    fn detects_array_textures() {
        let bytes = Builder::rgba8(2, 2, 1)
            .header_field(8, 3)
            .level(vec![0; 2 * 2 * 4 * 3])
            .build();

        let file = parse(&bytes[..]).unwrap();
        assert_eq!(file.header.target().unwrap(), Target::Texture2dArray);
    }

    #[test]
    fn rejects_a_bad_identifier() {
        let mut bytes = Builder::rgba8(4, 4, 1).level(vec![0; 64]).build();
        bytes[0] = b'X';
        assert!(parse(&bytes[..]).is_err());
    }

    #[test]
    fn rejects_truncated_payloads() {
        let mut bytes = Builder::rgba8(4, 4, 1).level(vec![0; 64]).build();
        bytes.truncate(bytes.len() - 32);
        assert!(parse(&bytes[..]).is_err());
    }

    #[test]
    fn rejects_unsupported_texture_kinds() {
        let cube = Builder::rgba8(4, 4, 1).header_field(9, 6).level(vec![0; 64]).build();
        assert!(parse(&cube[..]).unwrap().header.target().is_err());

        let volume = Builder::rgba8(4, 4, 1).header_field(7, 4).level(vec![0; 64]).build();
        assert!(parse(&volume[..]).unwrap().header.target().is_err());

        let compressed = Builder::rgba8(4, 4, 1).header_field(0, 0).level(vec![0; 64]).build();
        assert!(parse(&compressed[..]).unwrap().header.target().is_err());
    }

    #[test]
    fn mip_chain_length_matches_the_base_extent() {
        assert_eq!(mip_levels_for(1, 1), 1);
        assert_eq!(mip_levels_for(256, 256), 9);
        assert_eq!(mip_levels_for(640, 480), 10);
        assert_eq!(mip_levels_for(0, 0), 1);
    }
}
