// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::*;

// Corresponds to the I2OSP() function from RFC8017
pub(crate) fn i2osp(input: usize, length: usize) -> Result<Vec<u8>> {
    let sizeof_usize = core::mem::size_of::<usize>();

    // Check if input >= 256^length
    if (sizeof_usize as u32 - input.leading_zeros() / 8) > length as u32 {
        return arg_err!("value does not fit in the requested I2OSP length");
    }

    if length <= sizeof_usize {
        return Ok(input.to_be_bytes()[sizeof_usize - length..].to_vec());
    }

    let mut output = vec![0u8; length];
    output.splice(
        length - sizeof_usize..length,
        input.to_be_bytes().iter().cloned(),
    );
    Ok(output)
}

// Computes I2OSP(len(input), max_bytes) || input
pub(crate) fn serialize(input: &[u8], max_bytes: usize) -> Result<Vec<u8>> {
    Ok([&i2osp(input.len(), max_bytes)?, input].concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i2osp_pads_to_length() -> Result<()> {
        assert_eq!(i2osp(0x0102, 4)?, vec![0, 0, 1, 2]);
        assert_eq!(i2osp(7, 1)?, vec![7]);
        assert_eq!(i2osp(1, 12)?, [vec![0u8; 11], vec![1]].concat());
        Ok(())
    }

    #[test]
    fn i2osp_rejects_overflow() {
        assert!(i2osp(256, 1).is_err());
        assert!(i2osp(0x1_0000, 2).is_err());
    }

    #[test]
    fn serialize_prefixes_length() -> Result<()> {
        let encoded = serialize(&[9, 8, 7], 2)?;
        assert_eq!(encoded, vec![0, 3, 9, 8, 7]);

        // Prefixes keep "1" ++ "23" apart from "12" ++ "3"
        let left = [serialize(&[1], 2)?, serialize(&[2, 3], 2)?].concat();
        let right = [serialize(&[1, 2], 2)?, serialize(&[3], 2)?].concat();
        assert_ne!(left, right);
        Ok(())
    }
}
