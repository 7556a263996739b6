//! The seam between the codecs and the host simulation.
//!
//! The host owns its grid and network structures. For a save it lends them
//! read-only through [`HostAccess::state`]; for a load the codec decodes a
//! complete new state first and only then hands it over through
//! [`HostAccess::install`]. A failed decode never reaches `install`, so the
//! host keeps whatever it held before.

use crate::cursor::{ByteReader, ByteWriter};
use crate::envelope::{encode_envelope, open_envelope};
use crate::error::DecodeError;
use crate::report::{DecodeReport, DecodeStage};
use crate::version::{FormatVersion, VersionWidth};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Adapter over host-owned state of type `S`.
pub trait HostAccess<S> {
    /// Read-only view used while encoding.
    fn state(&self) -> &S;

    /// Replace the host's state wholesale with a freshly decoded one.
    fn install(&mut self, state: S);
}

/// A domain orchestrator: encodes and decodes one domain's payload.
pub trait DomainCodec {
    type State;

    /// Container tag written into the envelope.
    const TAG: &'static str;
    /// Width of the envelope's version field.
    const VERSION_WIDTH: VersionWidth;

    /// Version written by [`DomainCodec::encode`].
    fn current_version(&self) -> FormatVersion;

    /// Write the payload for `state` at the current version.
    fn encode(&self, state: &Self::State, out: &mut ByteWriter);

    /// Decode a payload stored at `version` into a newly allocated state.
    fn decode(
        &self,
        version: FormatVersion,
        input: &mut ByteReader<'_>,
        report: &mut DecodeReport,
    ) -> Result<Self::State, DecodeError>;

    /// State used when no data exists for this domain.
    fn default_state(&self) -> Self::State;

    /// Encode `state` into a bare payload.
    fn encode_payload(&self, state: &Self::State) -> Vec<u8> {
        let mut out = ByteWriter::new();
        self.encode(state, &mut out);
        tracing::info!(
            domain = Self::TAG,
            version = self.current_version().0,
            bytes = out.len(),
            "encoded payload"
        );
        out.into_vec()
    }

    /// Decode a bare payload, returning the state and the decode report.
    fn decode_payload(
        &self,
        version: FormatVersion,
        payload: &[u8],
    ) -> Result<(Self::State, DecodeReport), DecodeError> {
        let mut input = ByteReader::new(payload);
        let mut report = DecodeReport::new();
        let state = match self.decode(version, &mut input, &mut report) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(
                    domain = Self::TAG,
                    version = version.0,
                    stage = ?report.stage,
                    offset = input.position(),
                    error = %err,
                    "payload decode failed"
                );
                return Err(err);
            }
        };
        report.bytes_read = input.position();
        report.enter(Self::TAG, DecodeStage::Done);
        if input.remaining() > 0 {
            tracing::warn!(
                domain = Self::TAG,
                trailing = input.remaining(),
                "payload has unread trailing bytes"
            );
        }
        tracing::info!(
            domain = Self::TAG,
            version = version.0,
            bytes = report.bytes_read,
            anomalies = report.anomalies.len(),
            "decoded payload"
        );
        Ok((state, report))
    }
}

// ---------------------------------------------------------------------------
// Save / load entry points
// ---------------------------------------------------------------------------

/// Encode the host's current state into an enveloped blob.
pub fn save_domain<C, H>(codec: &C, host: &H) -> Vec<u8>
where
    C: DomainCodec,
    H: HostAccess<C::State>,
{
    let payload = codec.encode_payload(host.state());
    encode_envelope(C::TAG, C::VERSION_WIDTH, codec.current_version(), &payload)
}

/// Decode an enveloped blob and install the result into the host.
///
/// `None` means no data was stored for this domain (a fresh game): the host
/// receives the codec's default state and the call succeeds. On error the
/// host is left untouched; the caller decides whether to fall back to
/// [`install_defaults`].
pub fn load_domain<C, H>(
    codec: &C,
    host: &mut H,
    data: Option<&[u8]>,
) -> Result<DecodeReport, DecodeError>
where
    C: DomainCodec,
    H: HostAccess<C::State>,
{
    let Some(data) = data else {
        tracing::info!(domain = C::TAG, "no stored data, using defaults");
        install_defaults(codec, host);
        return Ok(DecodeReport::new());
    };

    let decoded = open_envelope(data, C::TAG, C::VERSION_WIDTH)
        .and_then(|envelope| codec.decode_payload(envelope.version, envelope.payload));
    match decoded {
        Ok((state, report)) => {
            host.install(state);
            Ok(report)
        }
        Err(err) => {
            tracing::warn!(domain = C::TAG, error = %err, "no usable data, host state left as is");
            Err(err)
        }
    }
}

/// Give the host the codec's default state.
pub fn install_defaults<C, H>(codec: &C, host: &mut H)
where
    C: DomainCodec,
    H: HostAccess<C::State>,
{
    host.install(codec.default_state());
}

// ---------------------------------------------------------------------------
// OwnedHost
// ---------------------------------------------------------------------------

/// Minimal host that owns its state directly and counts installs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedHost<S> {
    pub state: S,
    pub installs: usize,
}

impl<S> OwnedHost<S> {
    pub fn new(state: S) -> Self {
        Self { state, installs: 0 }
    }
}

impl<S> HostAccess<S> for OwnedHost<S> {
    fn state(&self) -> &S {
        &self.state
    }

    fn install(&mut self, state: S) {
        self.state = state;
        self.installs += 1;
    }
}
