//! Test fixtures and configuration helpers
//!
//! Provides pre-configured UEs and configuration builders.

use nextgsim_common::config::SessionConfig;
use nextgsim_common::{LogLevel, PdnType, Plmn, UeConfig};
use nextgsim_ue::{
    build_loopback_ue, indication_channel, IndicationReceiver, LoopbackMobility, LoopbackSession,
    UeNas,
};

use crate::test_utils::TestResult;

/// UE under test over the loopback layers
pub type TestUe = UeNas<LoopbackMobility, LoopbackSession>;

/// PDN context defined at start-up
#[derive(Debug, Clone)]
pub struct TestSession {
    /// Context identifier
    pub cid: u8,
    /// PDN type
    pub pdn_type: PdnType,
    /// Access Point Name
    pub apn: &'static str,
    /// Emergency bearer services
    pub is_emergency: bool,
}

impl TestSession {
    /// Non-emergency IPv4 context
    pub fn ipv4(cid: u8, apn: &'static str) -> Self {
        Self {
            cid,
            pdn_type: PdnType::Ipv4,
            apn,
            is_emergency: false,
        }
    }

    /// Emergency IPv4 context
    pub fn emergency(cid: u8) -> Self {
        Self {
            cid,
            pdn_type: PdnType::Ipv4,
            apn: "sos",
            is_emergency: true,
        }
    }
}

/// Test UE configuration
#[derive(Debug, Clone)]
pub struct TestUeConfig {
    /// IMSI
    pub imsi: String,
    /// MSISDN
    pub msisdn: Option<String>,
    /// IMEI
    pub imei: String,
    /// UE identifier
    pub ue_id: u32,
    /// Home PLMN
    pub hplmn: Plmn,
    /// PDN context table size
    pub max_pdn_contexts: u8,
    /// PDN contexts defined at start-up
    pub sessions: Vec<TestSession>,
    /// Log level
    pub log_level: LogLevel,
}

impl Default for TestUeConfig {
    fn default() -> Self {
        Self {
            imsi: "imsi-001010000000001".to_string(),
            msisdn: Some("+33611223344".to_string()),
            imei: "356938035643809".to_string(),
            ue_id: 1,
            hplmn: Plmn::new(1, 1, false),
            max_pdn_contexts: 4,
            sessions: vec![TestSession::ipv4(1, "internet")],
            log_level: LogLevel::Info,
        }
    }
}

impl TestUeConfig {
    /// Create a new test UE config with custom IMSI
    pub fn with_imsi(mut self, imsi: &str) -> Self {
        self.imsi = imsi.to_string();
        self
    }

    /// Set the PDN context table size
    pub fn with_max_pdn_contexts(mut self, max: u8) -> Self {
        self.max_pdn_contexts = max;
        self
    }

    /// Add a PDN context defined at start-up
    pub fn with_session(mut self, session: TestSession) -> Self {
        self.sessions.push(session);
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Drop every configured PDN context
    pub fn without_sessions(mut self) -> Self {
        self.sessions.clear();
        self
    }

    /// Convert to a UE configuration
    pub fn to_ue_config(&self) -> UeConfig {
        UeConfig {
            imsi: self.imsi.clone(),
            msisdn: self.msisdn.clone(),
            imei: self.imei.clone(),
            ue_id: self.ue_id,
            hplmn: self.hplmn,
            max_pdn_contexts: self.max_pdn_contexts,
            sessions: self
                .sessions
                .iter()
                .map(|s| SessionConfig {
                    cid: Some(s.cid),
                    pdn_type: s.pdn_type,
                    apn: Some(s.apn.to_string()),
                    is_emergency: s.is_emergency,
                })
                .collect(),
            log_level: self.log_level,
        }
    }

    /// Build a UE over the loopback layers together with its indication
    /// receiver
    pub fn build(&self) -> TestResult<(TestUe, IndicationReceiver)> {
        let (tx, rx) = indication_channel();
        let ue = build_loopback_ue(&self.to_ue_config(), tx)?;
        Ok((ue, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TestUeConfig::default().to_ue_config();
        assert!(nextgsim_ue::validate_ue_config(&config).is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TestUeConfig::default()
            .with_imsi("imsi-208930000000003")
            .with_max_pdn_contexts(6)
            .with_session(TestSession::emergency(6))
            .with_log_level(LogLevel::Trace);
        let ue_config = config.to_ue_config();
        assert_eq!(ue_config.max_pdn_contexts, 6);
        assert_eq!(ue_config.log_level, LogLevel::Trace);
        assert_eq!(ue_config.sessions.len(), 2);
        assert!(ue_config.sessions[1].is_emergency);
    }
}
